//! End-to-end tests driving the router with `tower::ServiceExt::oneshot`
//! against an in-memory database.

use std::collections::HashMap;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use chrono::Utc;
use mascotas_auth::{AuthConfig, RegisterInput};
use mascotas_core::models::foundation::{Foundation, FoundationInput};
use mascotas_core::models::pet::{Pet, PetInput};
use mascotas_core::repository::{AdoptionRepository, CrudRepository};
use mascotas_db::repository::{
    SurrealAdoptionRepository, SurrealFoundationRepository, SurrealPetRepository,
};
use mascotas_server::{AppState, routes};
use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: AppState,
    db: Surreal<Any>,
}

/// A browser stand-in that keeps cookies between requests.
struct Client {
    router: Router,
    cookies: HashMap<String, String>,
}

async fn setup() -> TestApp {
    let db = any::connect("mem://").await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mascotas_db::run_migrations(&db).await.unwrap();

    let state = AppState::new(db.clone(), AuthConfig::default());
    let router = routes().with_state(state.clone());
    TestApp { router, state, db }
}

impl TestApp {
    fn client(&self) -> Client {
        Client {
            router: self.router.clone(),
            cookies: HashMap::new(),
        }
    }

    async fn user(&self, username: &str, staff: bool) {
        self.state
            .auth
            .register(
                RegisterInput {
                    username: username.into(),
                    email: format!("{username}@example.com"),
                    password: "perrito123".into(),
                    password_confirmation: "perrito123".into(),
                    phone: None,
                    address: None,
                },
                staff,
            )
            .await
            .unwrap();
    }

    async fn foundation(&self, name: &str) -> Foundation {
        SurrealFoundationRepository::new(self.db.clone())
            .create(FoundationInput {
                name: name.into(),
                address: "Calle 10 #5-20".into(),
                phone: "6017654321".into(),
                email: "contacto@refugio.org".into(),
                description: None,
                capacity: 20,
            })
            .await
            .unwrap()
    }

    async fn pet(&self, name: &str, foundation: &Foundation) -> Pet {
        SurrealPetRepository::new(self.db.clone())
            .create(PetInput {
                name: name.into(),
                species: "Perro".into(),
                age: 3,
                photo: None,
                available: true,
                foundation_id: foundation.id,
            })
            .await
            .unwrap()
    }
}

fn encode(fields: &[(&str, &str)]) -> String {
    fn escape(value: &str) -> String {
        value
            .bytes()
            .map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    (b as char).to_string()
                }
                b' ' => "+".into(),
                _ => format!("%{b:02X}"),
            })
            .collect()
    }
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
        .collect::<Vec<_>>()
        .join("&")
}

impl Client {
    async fn send(&mut self, request: Request<Body>) -> Response<Body> {
        let response = self.router.clone().oneshot(request).await.unwrap();
        for value in response.headers().get_all(header::SET_COOKIE) {
            let pair = value.to_str().unwrap().split(';').next().unwrap();
            let (name, value) = pair.split_once('=').unwrap();
            if value.is_empty() {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_owned(), value.to_owned());
            }
        }
        response
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let cookie = self
            .cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ");
        let builder = Request::builder().method(method).uri(uri);
        if cookie.is_empty() {
            builder
        } else {
            builder.header(header::COOKIE, cookie)
        }
    }

    async fn get(&mut self, uri: &str) -> Response<Body> {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(encode(fields)))
            .unwrap();
        self.send(request).await
    }

    async fn login(&mut self, username: &str) {
        let email = format!("{username}@example.com");
        let response = self
            .post("/login/", &[("email", &email), ("password", "perrito123")])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/inicio/");
    }
}

fn location(response: &Response<Body>) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_owned()
}

async fn body(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// -----------------------------------------------------------------------
// Access control and accounts
// -----------------------------------------------------------------------

#[tokio::test]
async fn anonymous_users_are_sent_to_login() {
    let app = setup().await;
    let mut client = app.client();

    for uri in ["/inicio/", "/mis-adopciones/", "/fundaciones/", "/mascotas/"] {
        let response = client.get(uri).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login/");
    }

    let landing = client.get("/").await;
    assert_eq!(landing.status(), StatusCode::OK);
}

#[tokio::test]
async fn signed_in_users_skip_landing_login_and_registration() {
    let app = setup().await;
    app.user("ana", false).await;
    let mut client = app.client();
    client.login("ana").await;

    for uri in ["/", "/login/", "/registro/"] {
        let response = client.get(uri).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/inicio/");
    }
}

#[tokio::test]
async fn registration_signs_the_user_in() {
    let app = setup().await;
    let mut client = app.client();

    let response = client
        .post(
            "/registro/",
            &[
                ("username", "carla"),
                ("email", "carla@example.com"),
                ("password", "gatito123"),
                ("password_confirmation", "gatito123"),
                ("phone", ""),
                ("address", ""),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/inicio/");
    assert!(client.cookies.contains_key("mascotas_session"));

    let page = body(client.get("/inicio/").await).await;
    assert!(page.contains("Tu cuenta ha sido creada correctamente."));
    assert!(page.contains("carla"));
}

#[tokio::test]
async fn registration_errors_rerender_the_form() {
    let app = setup().await;
    let mut client = app.client();

    let response = client
        .post(
            "/registro/",
            &[
                ("username", "carla"),
                ("email", "carla@example.com"),
                ("password", "gatito123"),
                ("password_confirmation", "otra"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!client.cookies.contains_key("mascotas_session"));
    let page = body(response).await;
    assert!(page.contains("Los dos campos de contraseña no coinciden."));
    assert!(page.contains("value=\"carla\""));
}

#[tokio::test]
async fn wrong_password_shows_generic_message() {
    let app = setup().await;
    app.user("ana", false).await;
    let mut client = app.client();

    let response = client
        .post(
            "/login/",
            &[("email", "ana@example.com"), ("password", "equivocada")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body(response).await.contains("Correo o contraseña incorrectos."));
    assert!(!client.cookies.contains_key("mascotas_session"));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = setup().await;
    app.user("ana", false).await;
    let mut client = app.client();
    client.login("ana").await;

    let response = client.get("/logout/").await;
    assert_eq!(location(&response), "/login/");
    assert!(!client.cookies.contains_key("mascotas_session"));

    let page = body(client.get("/login/").await).await;
    assert!(page.contains("Has cerrado sesión correctamente."));

    let response = client.get("/inicio/").await;
    assert_eq!(location(&response), "/login/");
}

// -----------------------------------------------------------------------
// Adoption flow
// -----------------------------------------------------------------------

#[tokio::test]
async fn adoption_scenario() {
    let app = setup().await;
    let refugio = app.foundation("Refugio Sur").await;
    let rocky = app.pet("Rocky", &refugio).await;
    app.user("ana", false).await;
    app.user("beto", false).await;

    let mut ana = app.client();
    ana.login("ana").await;

    // Rocky shows on the dashboard.
    let page = body(ana.get("/inicio/").await).await;
    assert!(page.contains("Rocky"));

    // Adopt.
    let response = ana.post(&format!("/adoptar/{}/", rocky.id), &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let invoice_uri = location(&response);
    assert!(invoice_uri.starts_with("/factura/"));
    let adoption_id = invoice_uri
        .trim_start_matches("/factura/")
        .trim_end_matches('/')
        .to_owned();

    let page = body(ana.get(&invoice_uri).await).await;
    assert!(page.contains("¡Has adoptado a Rocky correctamente!"));
    assert!(page.contains("Refugio Sur"));
    assert!(page.contains(&Utc::now().date_naive().format("%d/%m/%Y").to_string()));

    // Rocky is no longer offered.
    let page = body(ana.get("/inicio/").await).await;
    assert!(!page.contains(&format!("/adoptar/{}/", rocky.id)));

    // Adopting again is refused with a message.
    let response = ana.post(&format!("/adoptar/{}/", rocky.id), &[]).await;
    assert_eq!(location(&response), "/inicio/");
    let page = body(ana.get("/inicio/").await).await;
    assert!(page.contains("La mascota Rocky ya fue adoptada."));
    let adoptions = SurrealAdoptionRepository::new(app.db.clone());
    assert_eq!(adoptions.count_for_pet(rocky.id).await.unwrap(), 1);

    // History.
    let page = body(ana.get("/mis-adopciones/").await).await;
    assert!(page.contains("Rocky"));
    assert!(page.contains(&invoice_uri));

    // beto may not see ana's invoice.
    let mut beto = app.client();
    beto.login("beto").await;
    let response = beto.get(&invoice_uri).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/inicio/");
    let page = body(beto.get("/inicio/").await).await;
    assert!(page.contains("No tienes permiso para ver esta factura."));

    let response = beto.get(&format!("{invoice_uri}?descargar=pdf")).await;
    assert_eq!(location(&response), "/inicio/");

    // ana downloads the PDF.
    let response = ana.get(&format!("{invoice_uri}?descargar=pdf")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap(),
        format!("attachment; filename=\"factura_{adoption_id}.pdf\"")
    );
    assert!(body(response).await.starts_with("%PDF-1.4"));
}

#[tokio::test]
async fn unknown_records_are_404() {
    let app = setup().await;
    app.user("ana", false).await;
    let mut client = app.client();
    client.login("ana").await;

    for uri in [
        "/fundacion/no-es-un-id/".to_owned(),
        format!("/fundacion/{}/", uuid::Uuid::new_v4()),
        format!("/factura/{}/", uuid::Uuid::new_v4()),
    ] {
        let response = client.get(&uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let response = client
        .post(&format!("/adoptar/{}/", uuid::Uuid::new_v4()), &[])
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn following_an_adoption_link_does_not_adopt() {
    let app = setup().await;
    let refugio = app.foundation("Refugio Sur").await;
    let rocky = app.pet("Rocky", &refugio).await;
    app.user("ana", false).await;
    let mut client = app.client();
    client.login("ana").await;

    let response = client.get(&format!("/adoptar/{}/", rocky.id)).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let adoptions = SurrealAdoptionRepository::new(app.db.clone());
    assert_eq!(adoptions.count_for_pet(rocky.id).await.unwrap(), 0);
    assert!(app.state.pets.get(rocky.id).await.unwrap().available);
}

#[tokio::test]
async fn foundation_detail_lists_its_pets() {
    let app = setup().await;
    let norte = app.foundation("Refugio Norte").await;
    let sur = app.foundation("Refugio Sur").await;
    app.pet("Luna", &norte).await;
    app.pet("Toby", &sur).await;
    app.user("ana", false).await;
    let mut client = app.client();
    client.login("ana").await;

    let page = body(client.get(&format!("/fundacion/{}/", norte.id)).await).await;
    assert!(page.contains("Refugio Norte"));
    assert!(page.contains("Luna"));
    assert!(!page.contains("Toby"));
}

// -----------------------------------------------------------------------
// CRUD
// -----------------------------------------------------------------------

#[tokio::test]
async fn crud_mutations_require_staff() {
    let app = setup().await;
    let refugio = app.foundation("Refugio Sur").await;
    app.user("ana", false).await;
    let mut client = app.client();
    client.login("ana").await;

    // Lists are readable.
    assert_eq!(client.get("/fundaciones/").await.status(), StatusCode::OK);

    for uri in [
        "/fundaciones/nueva/".to_owned(),
        format!("/fundaciones/{}/editar/", refugio.id),
        format!("/fundaciones/{}/eliminar/", refugio.id),
        "/mascotas/nueva/".to_owned(),
    ] {
        let response = client.get(&uri).await;
        assert_eq!(location(&response), "/inicio/", "{uri}");
    }

    let response = client
        .post(&format!("/fundaciones/{}/eliminar/", refugio.id), &[])
        .await;
    assert_eq!(location(&response), "/inicio/");
    assert!(app.state.foundations.get(refugio.id).await.is_ok());
}

#[tokio::test]
async fn staff_manage_foundations_and_pets() {
    let app = setup().await;
    app.user("operador", true).await;
    let mut client = app.client();
    client.login("operador").await;

    // Invalid submission re-renders with field errors and stores nothing.
    let response = client
        .post(
            "/fundaciones/nueva/",
            &[
                ("name", ""),
                ("address", "Calle 1"),
                ("phone", "123"),
                ("email", "mal"),
                ("capacity", "10"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body(response).await;
    assert!(page.contains("Este campo es obligatorio."));
    assert!(app.state.foundations.list().await.unwrap().is_empty());

    // Valid submission.
    let response = client
        .post(
            "/fundaciones/nueva/",
            &[
                ("name", "Huellitas"),
                ("address", "Calle 1"),
                ("phone", "123"),
                ("email", "huellitas@refugio.org"),
                ("description", ""),
                ("capacity", "10"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/fundaciones/");
    let foundations = app.state.foundations.list().await.unwrap();
    assert_eq!(foundations.len(), 1);
    let huellitas = &foundations[0];

    // Add a pet to it.
    let foundation_id = huellitas.id.to_string();
    let response = client
        .post(
            "/mascotas/nueva/",
            &[
                ("name", "Pelusa"),
                ("species", "Gato"),
                ("age", "2"),
                ("available", "on"),
                ("foundation_id", &foundation_id),
            ],
        )
        .await;
    assert_eq!(location(&response), "/mascotas/");
    let page = body(client.get("/mascotas/").await).await;
    assert!(page.contains("Pelusa"));
    assert!(page.contains("Huellitas"));

    // Edit the foundation.
    let response = client
        .post(
            &format!("/fundaciones/{}/editar/", huellitas.id),
            &[
                ("name", "Huellitas Felices"),
                ("address", "Calle 2"),
                ("phone", "456"),
                ("email", "huellitas@refugio.org"),
                ("capacity", "12"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/fundaciones/");
    let updated = app.state.foundations.get(huellitas.id).await.unwrap();
    assert_eq!(updated.name, "Huellitas Felices");
    assert_eq!(updated.capacity, 12);

    // Delete cascades to the pet.
    let response = client
        .post(&format!("/fundaciones/{}/eliminar/", huellitas.id), &[])
        .await;
    assert_eq!(location(&response), "/fundaciones/");
    assert!(app.state.foundations.list().await.unwrap().is_empty());
    assert!(app.state.pets.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn pet_with_unknown_foundation_is_rejected() {
    let app = setup().await;
    app.user("operador", true).await;
    let mut client = app.client();
    client.login("operador").await;

    let missing = uuid::Uuid::new_v4().to_string();
    let response = client
        .post(
            "/mascotas/nueva/",
            &[
                ("name", "Fantasma"),
                ("species", "Perro"),
                ("age", "1"),
                ("foundation_id", &missing),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body(response)
            .await
            .contains("Escoja una opción válida. Esa fundación no existe.")
    );
    assert!(app.state.pets.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn editing_a_missing_record_is_404() {
    let app = setup().await;
    app.user("operador", true).await;
    let mut client = app.client();
    client.login("operador").await;

    let uri = format!("/mascotas/{}/editar/", uuid::Uuid::new_v4());
    assert_eq!(client.get(&uri).await.status(), StatusCode::NOT_FOUND);
    let response = client.post(&uri, &[("name", "x")]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
