//! Integration tests for Foundation and Pet repository implementations
//! using in-memory SurrealDB.

use mascotas_core::error::MascotasError;
use mascotas_core::models::foundation::FoundationInput;
use mascotas_core::models::pet::PetInput;
use mascotas_core::models::user::CreateUser;
use mascotas_core::repository::{
    AdoptionRepository, CrudRepository, PetRepository, UserRepository,
};
use mascotas_db::repository::{
    SurrealAdoptionRepository, SurrealFoundationRepository, SurrealPetRepository,
    SurrealUserRepository, UNKNOWN_FOUNDATION,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mascotas_db::run_migrations(&db).await.unwrap();
    db
}

fn foundation_input(name: &str) -> FoundationInput {
    FoundationInput {
        name: name.into(),
        address: "Carrera 7 #12-34".into(),
        phone: "6011234567".into(),
        email: "hola@refugio.org".into(),
        description: Some("Perros y gatos rescatados".into()),
        capacity: 30,
    }
}

fn pet_input(name: &str, foundation_id: Uuid) -> PetInput {
    PetInput {
        name: name.into(),
        species: "Perro".into(),
        age: 2,
        photo: None,
        available: true,
        foundation_id,
    }
}

// -----------------------------------------------------------------------
// Foundation tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_foundation() {
    let db = setup().await;
    let repo = SurrealFoundationRepository::new(db);

    let foundation = repo.create(foundation_input("Refugio Sur")).await.unwrap();

    assert_eq!(foundation.name, "Refugio Sur");
    assert_eq!(foundation.capacity, 30);
    assert_eq!(
        foundation.description.as_deref(),
        Some("Perros y gatos rescatados")
    );

    let fetched = repo.get_by_id(foundation.id).await.unwrap();
    assert_eq!(fetched.id, foundation.id);
    assert_eq!(fetched.email, "hola@refugio.org");
}

#[tokio::test]
async fn blank_description_is_stored_as_none() {
    let db = setup().await;
    let repo = SurrealFoundationRepository::new(db);

    let mut input = foundation_input("Sin descripción");
    input.description = Some("   ".into());
    let foundation = repo.create(input).await.unwrap();

    assert!(foundation.description.is_none());
}

#[tokio::test]
async fn update_foundation_overwrites_fields() {
    let db = setup().await;
    let repo = SurrealFoundationRepository::new(db);

    let foundation = repo.create(foundation_input("Antes")).await.unwrap();

    let mut input = foundation_input("Después");
    input.description = None;
    input.capacity = 5;
    let updated = repo.update(foundation.id, input).await.unwrap();

    assert_eq!(updated.id, foundation.id);
    assert_eq!(updated.name, "Después");
    assert_eq!(updated.capacity, 5);
    assert!(updated.description.is_none());
    assert!(updated.updated_at >= foundation.updated_at);
}

#[tokio::test]
async fn update_missing_foundation_is_not_found() {
    let db = setup().await;
    let repo = SurrealFoundationRepository::new(db);

    let result = repo
        .update(Uuid::new_v4(), foundation_input("Fantasma"))
        .await;
    assert!(matches!(result, Err(MascotasError::NotFound { .. })));
}

#[tokio::test]
async fn delete_missing_foundation_is_not_found() {
    let db = setup().await;
    let repo = SurrealFoundationRepository::new(db);

    let result = repo.delete(Uuid::new_v4()).await;
    assert!(matches!(result, Err(MascotasError::NotFound { .. })));
}

#[tokio::test]
async fn list_returns_every_foundation() {
    let db = setup().await;
    let repo = SurrealFoundationRepository::new(db);

    for name in ["Uno", "Dos", "Tres"] {
        repo.create(foundation_input(name)).await.unwrap();
    }

    let all = repo.list().await.unwrap();
    assert_eq!(all.len(), 3);
}

// -----------------------------------------------------------------------
// Pet tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_pet_defaults_and_lookup() {
    let db = setup().await;
    let foundations = SurrealFoundationRepository::new(db.clone());
    let pets = SurrealPetRepository::new(db);

    let foundation = foundations.create(foundation_input("Refugio")).await.unwrap();
    let pet = pets.create(pet_input("Rocky", foundation.id)).await.unwrap();

    assert_eq!(pet.name, "Rocky");
    assert!(pet.available);
    assert_eq!(pet.foundation_id, foundation.id);

    let fetched = pets.get_by_id(pet.id).await.unwrap();
    assert_eq!(fetched.species, "Perro");
}

#[tokio::test]
async fn pet_requires_existing_foundation() {
    let db = setup().await;
    let pets = SurrealPetRepository::new(db);

    let result = pets.create(pet_input("Huérfano", Uuid::new_v4())).await;

    match result {
        Err(MascotasError::Validation(errors)) => {
            assert_eq!(errors.first("foundation_id"), Some(UNKNOWN_FOUNDATION));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(pets.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_available_and_by_foundation() {
    let db = setup().await;
    let foundations = SurrealFoundationRepository::new(db.clone());
    let pets = SurrealPetRepository::new(db);

    let north = foundations.create(foundation_input("Norte")).await.unwrap();
    let south = foundations.create(foundation_input("Sur")).await.unwrap();

    pets.create(pet_input("Max", north.id)).await.unwrap();
    let mut adopted = pet_input("Nina", north.id);
    adopted.available = false;
    pets.create(adopted).await.unwrap();
    pets.create(pet_input("Toby", south.id)).await.unwrap();

    let available = pets.list_available().await.unwrap();
    let mut names: Vec<_> = available.iter().map(|p| p.name.as_str()).collect();
    names.sort();
    assert_eq!(names, ["Max", "Toby"]);

    let in_north = pets.list_by_foundation(north.id).await.unwrap();
    assert_eq!(in_north.len(), 2);
    assert!(in_north.iter().all(|p| p.foundation_id == north.id));
}

#[tokio::test]
async fn update_pet_moves_it_between_foundations() {
    let db = setup().await;
    let foundations = SurrealFoundationRepository::new(db.clone());
    let pets = SurrealPetRepository::new(db);

    let a = foundations.create(foundation_input("A")).await.unwrap();
    let b = foundations.create(foundation_input("B")).await.unwrap();
    let pet = pets.create(pet_input("Kira", a.id)).await.unwrap();

    let mut input = pet_input("Kira", b.id);
    input.age = 4;
    let updated = pets.update(pet.id, input).await.unwrap();

    assert_eq!(updated.foundation_id, b.id);
    assert_eq!(updated.age, 4);
}

#[tokio::test]
async fn editing_an_adopted_pet_cannot_make_it_available_again() {
    let db = setup().await;
    let foundations = SurrealFoundationRepository::new(db.clone());
    let pets = SurrealPetRepository::new(db.clone());
    let users = SurrealUserRepository::new(db.clone());
    let adoptions = SurrealAdoptionRepository::new(db);

    let foundation = foundations.create(foundation_input("Refugio")).await.unwrap();
    let pet = pets.create(pet_input("Bruno", foundation.id)).await.unwrap();
    let user = users
        .create(CreateUser {
            username: "ana".into(),
            email: "ana@example.com".into(),
            password: "correcthorse".into(),
            phone: None,
            address: None,
            is_staff: false,
        })
        .await
        .unwrap();
    adoptions.adopt(user.id, pet.id).await.unwrap();

    let updated = pets
        .update(pet.id, pet_input("Bruno", foundation.id))
        .await
        .unwrap();
    assert!(!updated.available);
}

#[tokio::test]
async fn delete_pet_removes_its_adoption() {
    let db = setup().await;
    let foundations = SurrealFoundationRepository::new(db.clone());
    let pets = SurrealPetRepository::new(db.clone());
    let users = SurrealUserRepository::new(db.clone());
    let adoptions = SurrealAdoptionRepository::new(db);

    let foundation = foundations.create(foundation_input("Refugio")).await.unwrap();
    let pet = pets.create(pet_input("Coco", foundation.id)).await.unwrap();
    let user = users
        .create(CreateUser {
            username: "beto".into(),
            email: "beto@example.com".into(),
            password: "correcthorse".into(),
            phone: None,
            address: None,
            is_staff: false,
        })
        .await
        .unwrap();
    let adoption = adoptions.adopt(user.id, pet.id).await.unwrap();

    pets.delete(pet.id).await.unwrap();

    assert!(pets.get_by_id(pet.id).await.is_err());
    assert!(matches!(
        adoptions.get_by_id(adoption.id).await,
        Err(MascotasError::NotFound { .. })
    ));
}

// -----------------------------------------------------------------------
// Cascade
// -----------------------------------------------------------------------

#[tokio::test]
async fn delete_foundation_cascades_to_pets_and_adoptions() {
    let db = setup().await;
    let foundations = SurrealFoundationRepository::new(db.clone());
    let pets = SurrealPetRepository::new(db.clone());
    let users = SurrealUserRepository::new(db.clone());
    let adoptions = SurrealAdoptionRepository::new(db);

    let doomed = foundations.create(foundation_input("Cierra")).await.unwrap();
    let survivor = foundations.create(foundation_input("Sigue")).await.unwrap();

    let rocky = pets.create(pet_input("Rocky", doomed.id)).await.unwrap();
    let luna = pets.create(pet_input("Luna", doomed.id)).await.unwrap();
    let toby = pets.create(pet_input("Toby", survivor.id)).await.unwrap();

    let user = users
        .create(CreateUser {
            username: "ana".into(),
            email: "ana@example.com".into(),
            password: "correcthorse".into(),
            phone: None,
            address: None,
            is_staff: false,
        })
        .await
        .unwrap();
    let rocky_adoption = adoptions.adopt(user.id, rocky.id).await.unwrap();
    let toby_adoption = adoptions.adopt(user.id, toby.id).await.unwrap();

    foundations.delete(doomed.id).await.unwrap();

    assert!(foundations.get_by_id(doomed.id).await.is_err());
    assert!(pets.get_by_id(rocky.id).await.is_err());
    assert!(pets.get_by_id(luna.id).await.is_err());
    assert!(adoptions.get_by_id(rocky_adoption.id).await.is_err());

    // Records of other foundations are untouched.
    assert!(pets.get_by_id(toby.id).await.is_ok());
    assert!(adoptions.get_by_id(toby_adoption.id).await.is_ok());
    assert_eq!(adoptions.list_by_user(user.id).await.unwrap().len(), 1);
}
