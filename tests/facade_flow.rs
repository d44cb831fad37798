//! Integration tests for the pet and tutor facades: pagination, search,
//! CRUD orchestration, linking, and photo upload against a mock server.

mod common;

use petrack_core::{PetFacade, PetUpsert, ToastKind, TutorFacade, TutorUpsert};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{setup_with_session, valid_session, TestContext};

fn ctx_and_server(server: &MockServer) -> TestContext {
    setup_with_session(&server.uri(), &valid_session("A1", Some("R1")))
}

#[tokio::test]
async fn pets_load_normalizes_page_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pets"))
        .and(query_param("page", "0"))
        .and(query_param("size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                { "id": 1, "nome": "Rex" },
                { "id": 2, "nome": "Mia" }
            ],
            "totalElements": 23
        })))
        .mount(&server)
        .await;

    let ctx = ctx_and_server(&server);
    let facade = PetFacade::new(ctx.api.clone(), ctx.notifier.clone());
    facade.load().await;

    let state = facade.state();
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.total, 23);
    assert!(!state.loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn pets_load_normalizes_array_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "nome": "Rex" }
        ])))
        .mount(&server)
        .await;

    let ctx = ctx_and_server(&server);
    let facade = PetFacade::new(ctx.api.clone(), ctx.notifier.clone());
    facade.load().await;

    let state = facade.state();
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.total, 1);
}

#[tokio::test]
async fn search_resets_to_first_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pets"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [],
            "totalElements": 0
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pets"))
        .and(query_param("page", "0"))
        .and(query_param("nome", "rex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "id": 1, "nome": "Rex" }],
            "totalElements": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = ctx_and_server(&server);
    let facade = PetFacade::new(ctx.api.clone(), ctx.notifier.clone());
    facade.set_page(2).await;
    assert_eq!(facade.state().page, 2);

    facade.search("  rex  ").await;
    let state = facade.state();
    assert_eq!(state.page, 0);
    assert_eq!(state.search_term, "rex");
    assert_eq!(state.items.len(), 1);
}

#[tokio::test]
async fn pets_load_failure_sets_error_and_empties_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "API indisponível" })),
        )
        .mount(&server)
        .await;

    let ctx = ctx_and_server(&server);
    let facade = PetFacade::new(ctx.api.clone(), ctx.notifier.clone());
    facade.load().await;

    let state = facade.state();
    assert!(state.items.is_empty());
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("API indisponível"));
}

#[tokio::test]
async fn create_pet_notifies_and_reloads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pets"))
        .and(body_json(json!({ "nome": "Rex", "tutorId": 7 })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "id": 9, "nome": "Rex", "tutorId": 7 })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "id": 9, "nome": "Rex" }],
            "totalElements": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = ctx_and_server(&server);
    let facade = PetFacade::new(ctx.api.clone(), ctx.notifier.clone());
    let created = facade
        .create(PetUpsert {
            nome: Some("Rex".to_string()),
            tutor_id: Some(7),
            ..PetUpsert::default()
        })
        .await;

    assert_eq!(created.unwrap().id, 9);
    assert_eq!(facade.state().items.len(), 1);
    let toast = ctx.notifier.state();
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.message, "Pet criado com sucesso.");
}

#[tokio::test]
async fn delete_pet_clears_selection_and_reloads() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/pets/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [],
            "totalElements": 0
        })))
        .mount(&server)
        .await;

    let ctx = ctx_and_server(&server);
    let facade = PetFacade::new(ctx.api.clone(), ctx.notifier.clone());
    assert!(facade.delete(9).await);
    assert!(facade.selected().is_none());
    assert!(facade.state().items.is_empty());
}

#[tokio::test]
async fn upload_photo_refreshes_selected_pet() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pets/3/foto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pets/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "nome": "Bolt",
            "foto": "http://cdn/bolt.jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = ctx_and_server(&server);
    let facade = PetFacade::new(ctx.api.clone(), ctx.notifier.clone());
    let uploaded = facade
        .upload_photo(3, "bolt.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF])
        .await;

    assert!(uploaded);
    let selected = facade.selected().unwrap();
    assert_eq!(selected.foto.as_deref(), Some("http://cdn/bolt.jpg"));
}

#[tokio::test]
async fn tutores_load_falls_back_to_item_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tutores"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 0,
            "size": 10,
            "total": 0,
            "pageCount": 0,
            "content": [
                { "id": 1, "nome": "Ana" },
                { "id": 2, "nome": "Bruno" }
            ]
        })))
        .mount(&server)
        .await;

    let ctx = ctx_and_server(&server);
    let facade = TutorFacade::new(ctx.api.clone(), ctx.notifier.clone());
    facade.load().await;

    let state = facade.state();
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.total, 2);
}

#[tokio::test]
async fn tutor_detail_loads_linked_pets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tutores/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "nome": "Ana",
            "telefone": "11987654321",
            "cpf": 12345678901i64
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tutores/7/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "nome": "Bolt" }
        ])))
        .mount(&server)
        .await;

    let ctx = ctx_and_server(&server);
    let facade = TutorFacade::new(ctx.api.clone(), ctx.notifier.clone());
    facade.load_by_id(7).await;

    assert_eq!(facade.selected().unwrap().nome, "Ana");
    let pets = facade.tutor_pets();
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0].nome, "Bolt");

    facade.clear_selected();
    assert!(facade.selected().is_none());
    assert!(facade.tutor_pets().is_empty());
}

#[tokio::test]
async fn link_and_unlink_pet_hit_the_nested_route() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tutores/7/pets/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tutores/7/pets/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tutores/7/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let ctx = ctx_and_server(&server);
    let facade = TutorFacade::new(ctx.api.clone(), ctx.notifier.clone());
    assert!(facade.link_pet(7, 3).await);
    assert!(facade.unlink_pet(7, 3).await);
}

#[tokio::test]
async fn update_tutor_refreshes_selection() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tutores/7"))
        .and(body_json(json!({ "nome": "Ana Maria" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 7, "nome": "Ana Maria" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tutores"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 0, "size": 10, "total": 1, "pageCount": 1,
            "content": [{ "id": 7, "nome": "Ana Maria" }]
        })))
        .mount(&server)
        .await;

    let ctx = ctx_and_server(&server);
    let facade = TutorFacade::new(ctx.api.clone(), ctx.notifier.clone());
    let updated = facade
        .update(
            7,
            TutorUpsert {
                nome: Some("Ana Maria".to_string()),
                ..TutorUpsert::default()
            },
        )
        .await;

    assert_eq!(updated.unwrap().nome, "Ana Maria");
    assert_eq!(facade.selected().unwrap().nome, "Ana Maria");
}

#[tokio::test]
async fn create_tutor_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tutores"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "CPF inválido" })),
        )
        .mount(&server)
        .await;

    let ctx = ctx_and_server(&server);
    let facade = TutorFacade::new(ctx.api.clone(), ctx.notifier.clone());
    let created = facade
        .create(TutorUpsert {
            nome: Some("Ana".to_string()),
            cpf: Some(1),
            ..TutorUpsert::default()
        })
        .await;

    assert!(created.is_none());
    let toast = ctx.notifier.state();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.message, "CPF inválido");
}
