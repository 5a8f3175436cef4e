//! Tests del ciclo de vida contra PostgreSQL real.
//!
//! Necesitan una base de datos con el esquema cargado y DATABASE_URL
//! apuntando a ella, por eso van marcados con #[ignore]:
//!
//! ```text
//! DATABASE_URL=postgresql://... cargo test -- --ignored
//! ```

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use car_rental_api::models::car::Car;
use car_rental_api::models::rental::RentalStatus;
use car_rental_api::models::user::{User, UserRole};
use car_rental_api::repositories::car_repository::CarRepository;
use car_rental_api::repositories::rental_repository::RentalRepository;
use car_rental_api::repositories::user_repository::UserRepository;
use car_rental_api::utils::errors::AppError;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPool::connect(&url).await.expect("failed to connect")
}

async fn seed_car(pool: &PgPool) -> Car {
    let plate = format!("TT-{}", &Uuid::new_v4().simple().to_string()[..6]);
    let car = Car::new(
        "Seat".to_string(),
        "Ibiza".to_string(),
        plate,
        2021,
        "Red".to_string(),
        "manual".to_string(),
        "gasoline".to_string(),
        5,
        Decimal::new(4500, 2),
        None,
        None,
    );
    CarRepository::new(pool.clone())
        .create(&car)
        .await
        .expect("failed to seed car")
}

async fn seed_user(pool: &PgPool) -> User {
    let email = format!("renter-{}@example.com", Uuid::new_v4().simple());
    let user = User::new(
        "Test Renter".to_string(),
        email,
        "$2b$12$testhashtesthashtesthash".to_string(),
        UserRole::Customer,
    );
    UserRepository::new(pool.clone())
        .create(&user)
        .await
        .expect("failed to seed user")
}

#[tokio::test]
#[ignore]
async fn test_booking_flips_flag_and_blocks_second_booking() {
    let pool = test_pool().await;
    let car = seed_car(&pool).await;
    let user = seed_user(&pool).await;

    let cars = CarRepository::new(pool.clone());
    let rentals = RentalRepository::new(pool.clone());

    let start = Utc::now().date_naive();
    let end = start + Duration::days(3);

    let rental = rentals
        .create_booking(car.id, user.id, start, end, None)
        .await
        .expect("first booking should succeed");
    assert_eq!(rental.status, RentalStatus::Pending);
    assert_eq!(rental.total_amount, Decimal::new(13500, 2));

    let locked = cars.find_by_id(car.id).await.unwrap().unwrap();
    assert!(!locked.is_available);

    // El coche ya está ocupado: da igual el rango que se pida
    let err = rentals
        .create_booking(car.id, user.id, start + Duration::days(30), end + Duration::days(30), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::CarUnavailable(_)));
}

#[tokio::test]
#[ignore]
async fn test_terminal_transition_releases_car_exactly_once() {
    let pool = test_pool().await;
    let car = seed_car(&pool).await;
    let user = seed_user(&pool).await;

    let cars = CarRepository::new(pool.clone());
    let rentals = RentalRepository::new(pool.clone());

    let start = Utc::now().date_naive();
    let end = start + Duration::days(2);
    let rental = rentals
        .create_booking(car.id, user.id, start, end, None)
        .await
        .unwrap();

    let cancelled = rentals
        .update_booking(rental.id, user.id, false, None, None, Some(RentalStatus::Cancelled), None)
        .await
        .unwrap();
    assert_eq!(cancelled.status, RentalStatus::Cancelled);
    assert!(cars.find_by_id(car.id).await.unwrap().unwrap().is_available);

    // Repetir la misma petición: no-op, sin error ni segunda liberación
    let repeat = rentals
        .update_booking(rental.id, user.id, false, None, None, Some(RentalStatus::Cancelled), None)
        .await
        .unwrap();
    assert_eq!(repeat.status, RentalStatus::Cancelled);
}

#[tokio::test]
#[ignore]
async fn test_invalid_range_update_persists_nothing() {
    let pool = test_pool().await;
    let car = seed_car(&pool).await;
    let user = seed_user(&pool).await;

    let rentals = RentalRepository::new(pool.clone());
    let start = Utc::now().date_naive();
    let end = start + Duration::days(4);
    let rental = rentals
        .create_booking(car.id, user.id, start, end, None)
        .await
        .unwrap();

    let err = rentals
        .update_booking(rental.id, user.id, false, Some(end), Some(start), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidRange(_)));

    let unchanged = rentals.find_by_id(rental.id).await.unwrap().unwrap();
    assert_eq!(unchanged.start_date, start);
    assert_eq!(unchanged.end_date, end);
    assert_eq!(unchanged.total_amount, rental.total_amount);
}

#[tokio::test]
#[ignore]
async fn test_repeated_activation_is_idempotent() {
    let pool = test_pool().await;
    let car = seed_car(&pool).await;
    let user = seed_user(&pool).await;

    let rentals = RentalRepository::new(pool.clone());
    let start = Utc::now().date_naive();
    let rental = rentals
        .create_booking(car.id, user.id, start, start + Duration::days(1), None)
        .await
        .unwrap();

    let first = rentals.activate_if_pending(rental.id).await.unwrap();
    assert_eq!(first.status, RentalStatus::Active);

    // Confirmación repetida del proveedor: sin transición duplicada ni error
    let second = rentals.activate_if_pending(rental.id).await.unwrap();
    assert_eq!(second.status, RentalStatus::Active);

    // El coche sigue ocupado tras activar
    let locked = CarRepository::new(pool.clone()).find_by_id(car.id).await.unwrap().unwrap();
    assert!(!locked.is_available);
}

#[tokio::test]
#[ignore]
async fn test_delete_always_frees_the_car() {
    let pool = test_pool().await;
    let car = seed_car(&pool).await;
    let user = seed_user(&pool).await;

    let cars = CarRepository::new(pool.clone());
    let rentals = RentalRepository::new(pool.clone());

    let start = Utc::now().date_naive();
    let rental = rentals
        .create_booking(car.id, user.id, start, start + Duration::days(2), None)
        .await
        .unwrap();

    // Completar primero: el coche queda libre y el alquiler terminal
    rentals
        .update_booking(rental.id, user.id, false, None, None, Some(RentalStatus::Cancelled), None)
        .await
        .unwrap();

    // Borrado de un alquiler ya terminal: el coche sigue libre después
    rentals.delete_booking(rental.id, user.id, false).await.unwrap();
    assert!(cars.find_by_id(car.id).await.unwrap().unwrap().is_available);
    assert!(rentals.find_by_id(rental.id).await.unwrap().is_none());
}
