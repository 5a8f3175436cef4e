//! Modelo de Rental
//!
//! Este módulo contiene el struct Rental, el enum RentalStatus y la máquina
//! de estados del ciclo de vida de un alquiler:
//!
//! ```text
//! pending -> active -> completed
//! pending -> cancelled
//! active  -> cancelled
//! ```
//!
//! `completed` y `cancelled` son estados terminales: ninguna transición sale
//! de ellos. Fijar un estado a su valor actual es un no-op legal (así la
//! liberación del coche al entrar en estado terminal nunca se dispara dos
//! veces).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Estado del alquiler - mapea al ENUM rental_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "rental_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

impl RentalStatus {
    /// Un alquiler no terminal es el que ocupa el coche
    pub fn is_terminal(&self) -> bool {
        matches!(self, RentalStatus::Completed | RentalStatus::Cancelled)
    }

    /// Matriz de transiciones legales. El mismo estado siempre es legal (no-op).
    pub fn can_transition_to(&self, new: RentalStatus) -> bool {
        if *self == new {
            return true;
        }
        match self {
            RentalStatus::Pending => matches!(new, RentalStatus::Active | RentalStatus::Cancelled),
            RentalStatus::Active => {
                matches!(new, RentalStatus::Completed | RentalStatus::Cancelled)
            }
            RentalStatus::Completed | RentalStatus::Cancelled => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Active => "active",
            RentalStatus::Completed => "completed",
            RentalStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<RentalStatus> {
        match value {
            "pending" => Some(RentalStatus::Pending),
            "active" => Some(RentalStatus::Active),
            "completed" => Some(RentalStatus::Completed),
            "cancelled" => Some(RentalStatus::Cancelled),
            _ => None,
        }
    }
}

/// Rental principal - mapea exactamente a la tabla rentals
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rental {
    pub id: Uuid,
    pub car_id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_amount: Decimal,
    pub status: RentalStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// ¿Debe liberarse el coche al pasar de `old` a `new`?
/// Solo al entrar en un estado terminal desde uno no terminal: re-fijar un
/// estado terminal ya alcanzado no vuelve a disparar la liberación.
pub fn releases_car(old: RentalStatus, new: RentalStatus) -> bool {
    !old.is_terminal() && new.is_terminal()
}

/// Importe total de un alquiler: días naturales completos × tarifa diaria.
/// Sin prorrateo de días parciales. Los llamadores garantizan end > start;
/// un rango de cero días o negativo nunca debe llegar aquí.
pub fn compute_total(daily_rate: Decimal, start_date: NaiveDate, end_date: NaiveDate) -> Decimal {
    let days = (end_date - start_date).num_days();
    daily_rate * Decimal::from(days)
}

/// Patch validado sobre un alquiler, listo para persistir
#[derive(Debug, PartialEq, Eq)]
pub struct BookingUpdate {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RentalStatus,
    pub dates_changed: bool,
    pub release_car: bool,
}

/// Valida un patch contra el alquiler actual sin tocar almacenamiento.
///
/// Devuelve `Ok(None)` para el único cambio legal sobre un alquiler
/// terminal: re-fijar exactamente el mismo estado sin más campos (no-op).
/// Cualquier otro cambio sobre un terminal, una transición ilegal o un
/// rango de fechas inválido falla aquí, antes de cualquier escritura.
pub fn plan_booking_update(
    current: &Rental,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    new_status: Option<RentalStatus>,
    touches_notes: bool,
) -> Result<Option<BookingUpdate>, AppError> {
    if current.status.is_terminal() {
        if new_status == Some(current.status)
            && start_date.is_none()
            && end_date.is_none()
            && !touches_notes
        {
            return Ok(None);
        }
        return Err(AppError::InvalidTransition(format!(
            "Rental is already {}",
            current.status.as_str()
        )));
    }

    if let Some(status) = new_status {
        if !current.status.can_transition_to(status) {
            return Err(AppError::InvalidTransition(format!(
                "Cannot transition from {} to {}",
                current.status.as_str(),
                status.as_str()
            )));
        }
    }

    let merged_start = start_date.unwrap_or(current.start_date);
    let merged_end = end_date.unwrap_or(current.end_date);
    let dates_changed = merged_start != current.start_date || merged_end != current.end_date;

    if dates_changed && merged_end <= merged_start {
        return Err(AppError::InvalidRange(
            "end_date must be after start_date".to_string(),
        ));
    }

    let status = new_status.unwrap_or(current.status);

    Ok(Some(BookingUpdate {
        start_date: merged_start,
        end_date: merged_end,
        status,
        dates_changed,
        release_car: releases_car(current.status, status),
    }))
}

impl Rental {
    pub fn new(
        car_id: Uuid,
        user_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        total_amount: Decimal,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            car_id,
            user_id,
            start_date,
            end_date,
            total_amount,
            status: RentalStatus::Pending,
            notes,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!RentalStatus::Pending.is_terminal());
        assert!(!RentalStatus::Active.is_terminal());
        assert!(RentalStatus::Completed.is_terminal());
        assert!(RentalStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_legal_transitions() {
        assert!(RentalStatus::Pending.can_transition_to(RentalStatus::Active));
        assert!(RentalStatus::Pending.can_transition_to(RentalStatus::Cancelled));
        assert!(RentalStatus::Active.can_transition_to(RentalStatus::Completed));
        assert!(RentalStatus::Active.can_transition_to(RentalStatus::Cancelled));
    }

    #[test]
    fn test_illegal_transitions() {
        // pending no puede saltar directamente a completed
        assert!(!RentalStatus::Pending.can_transition_to(RentalStatus::Completed));
        assert!(!RentalStatus::Active.can_transition_to(RentalStatus::Pending));
        // los estados terminales no admiten ninguna salida
        assert!(!RentalStatus::Completed.can_transition_to(RentalStatus::Pending));
        assert!(!RentalStatus::Completed.can_transition_to(RentalStatus::Active));
        assert!(!RentalStatus::Completed.can_transition_to(RentalStatus::Cancelled));
        assert!(!RentalStatus::Cancelled.can_transition_to(RentalStatus::Completed));
    }

    #[test]
    fn test_same_status_is_noop() {
        assert!(RentalStatus::Completed.can_transition_to(RentalStatus::Completed));
        assert!(RentalStatus::Cancelled.can_transition_to(RentalStatus::Cancelled));
        assert!(RentalStatus::Pending.can_transition_to(RentalStatus::Pending));
    }

    #[test]
    fn test_release_fires_on_terminal_entry_only() {
        assert!(releases_car(RentalStatus::Pending, RentalStatus::Cancelled));
        assert!(releases_car(RentalStatus::Active, RentalStatus::Completed));
        assert!(releases_car(RentalStatus::Active, RentalStatus::Cancelled));
        // activación: el coche sigue ocupado
        assert!(!releases_car(RentalStatus::Pending, RentalStatus::Active));
        // re-fijar el mismo estado terminal no libera dos veces
        assert!(!releases_car(RentalStatus::Completed, RentalStatus::Completed));
        assert!(!releases_car(RentalStatus::Cancelled, RentalStatus::Cancelled));
    }

    #[test]
    fn test_compute_total_whole_days() {
        // 50.00/día, 2023-03-15 a 2023-03-20 => 5 días => 250.00
        let rate = Decimal::new(5000, 2);
        let start = NaiveDate::from_ymd_opt(2023, 3, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 3, 20).unwrap();
        assert_eq!(compute_total(rate, start, end), Decimal::new(25000, 2));
    }

    #[test]
    fn test_compute_total_single_day() {
        let rate = Decimal::new(7550, 2); // 75.50
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(compute_total(rate, start, end), Decimal::new(7550, 2));
    }

    #[test]
    fn test_compute_total_crosses_month_boundary() {
        let rate = Decimal::new(10000, 2); // 100.00
        let start = NaiveDate::from_ymd_opt(2023, 1, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 2, 3).unwrap();
        assert_eq!(compute_total(rate, start, end), Decimal::new(40000, 2));
    }

    fn test_rental(status: RentalStatus) -> Rental {
        let mut rental = Rental::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            Decimal::new(20000, 2),
            None,
        );
        rental.status = status;
        rental
    }

    #[test]
    fn test_plan_complete_releases_then_repeat_is_noop() {
        let active = test_rental(RentalStatus::Active);
        let plan = plan_booking_update(&active, None, None, Some(RentalStatus::Completed), false)
            .unwrap()
            .unwrap();
        assert_eq!(plan.status, RentalStatus::Completed);
        assert!(plan.release_car);

        // segunda petición idéntica sobre el alquiler ya completado: no-op
        let completed = test_rental(RentalStatus::Completed);
        let repeat =
            plan_booking_update(&completed, None, None, Some(RentalStatus::Completed), false)
                .unwrap();
        assert!(repeat.is_none());
    }

    #[test]
    fn test_plan_same_nonterminal_status_does_not_release() {
        let active = test_rental(RentalStatus::Active);
        let plan = plan_booking_update(&active, None, None, Some(RentalStatus::Active), false)
            .unwrap()
            .unwrap();
        assert_eq!(plan.status, RentalStatus::Active);
        assert!(!plan.release_car);
    }

    #[test]
    fn test_plan_rejects_inverted_range_before_any_write() {
        let pending = test_rental(RentalStatus::Pending);
        let err = plan_booking_update(
            &pending,
            Some(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()),
            Some(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()),
            None,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidRange(_)));
    }

    #[test]
    fn test_plan_rejects_changes_on_terminal_rental() {
        let cancelled = test_rental(RentalStatus::Cancelled);
        let err = plan_booking_update(
            &cancelled,
            Some(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()),
            None,
            None,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));

        // notas tampoco: un terminal solo acepta el no-op de mismo estado
        let err = plan_booking_update(&cancelled, None, None, None, true).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn test_plan_rejects_illegal_transition() {
        let pending = test_rental(RentalStatus::Pending);
        let err = plan_booking_update(&pending, None, None, Some(RentalStatus::Completed), false)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn test_plan_date_change_flags_recompute() {
        let pending = test_rental(RentalStatus::Pending);
        let plan = plan_booking_update(
            &pending,
            None,
            Some(NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()),
            None,
            false,
        )
        .unwrap()
        .unwrap();
        assert!(plan.dates_changed);
        assert_eq!(plan.end_date, NaiveDate::from_ymd_opt(2024, 6, 8).unwrap());
        assert_eq!(plan.start_date, pending.start_date);
    }

    #[test]
    fn test_parse_roundtrip() {
        for status in [
            RentalStatus::Pending,
            RentalStatus::Active,
            RentalStatus::Completed,
            RentalStatus::Cancelled,
        ] {
            assert_eq!(RentalStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RentalStatus::parse("unknown"), None);
    }
}
