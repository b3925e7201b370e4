use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use zoo_sanctuary::{build_router, AppState, LogMailer, Mailer, SqliteStore};

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
async fn spawn_test_server() -> String {
    let store = SqliteStore::open_in_memory().unwrap();
    let state = AppState::new(store, Mailer::Log(LogMailer), Duration::from_secs(1));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

async fn post(client: &Client, url: String, body: Value) -> (StatusCode, Value) {
    let resp = client.post(url).json(&body).send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap_or(Value::Null))
}

fn keeper_body(contact: &str) -> Value {
    json!({
        "name": "Ana",
        "contact": contact,
        "specialty": "Felines",
        "status": "Active",
        "workShift": "Morning"
    })
}

fn animal_body(name: &str, keeper_id: Option<i64>, habitat_id: Option<i64>) -> Value {
    json!({
        "name": name,
        "species": "Lion",
        "age": 5,
        "sex": "M",
        "arrivalDate": "2024-03-01",
        "status": "Healthy",
        "keeperId": keeper_id,
        "habitatId": habitat_id
    })
}

async fn create_keeper(client: &Client, base: &str, contact: &str) -> i64 {
    let (status, body) = post(client, format!("{}/api/cuidadores", base), keeper_body(contact)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_habitat(client: &Client, base: &str, capacity: u32) -> i64 {
    let (status, body) = post(
        client,
        format!("{}/api/habitats", base),
        json!({"name": "Savana", "type": "Grassland", "capacity": capacity, "status": "Open"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

fn assert_error_body(body: &Value, status: u16) {
    assert_eq!(body["status"], status);
    assert!(body["timestamp"].is_string());
    assert!(body["error"].is_string());
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let base = spawn_test_server().await;
    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn animal_lifecycle_over_http() {
    let base = spawn_test_server().await;
    let client = Client::new();
    let keeper_id = create_keeper(&client, &base, "ana@zoo.example").await;
    let habitat_id = create_habitat(&client, &base, 3).await;

    let (status, created) = post(
        &client,
        format!("{}/api/animals", base),
        animal_body("Simba", Some(keeper_id), Some(habitat_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["keeperId"], keeper_id);
    assert_eq!(created["arrivalDate"], "2024-03-01");
    let id = created["id"].as_i64().unwrap();

    let fetched: Value = client
        .get(format!("{}/api/animals/{}", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    let mut changes = animal_body("Simba", Some(keeper_id), Some(habitat_id));
    changes["age"] = json!(6);
    let resp = client
        .put(format!("{}/api/animals/{}", base, id))
        .json(&changes)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["age"], 6);

    let resp = client
        .delete(format!("{}/api/animals/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{}/api/animals/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn animal_without_keeper_is_bad_request() {
    let base = spawn_test_server().await;
    let client = Client::new();

    let (status, body) = post(
        &client,
        format!("{}/api/animals", base),
        animal_body("Simba", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, 400);
    assert_eq!(body["message"], "Animal must have a caretaker associated.");
}

#[tokio::test]
async fn full_habitat_is_bad_request() {
    let base = spawn_test_server().await;
    let client = Client::new();
    let keeper_id = create_keeper(&client, &base, "ana@zoo.example").await;
    let habitat_id = create_habitat(&client, &base, 1).await;
    let url = format!("{}/api/animals", base);

    let (first, _) = post(&client, url.clone(), animal_body("Simba", Some(keeper_id), Some(habitat_id))).await;
    let (second, body) = post(&client, url, animal_body("Nala", Some(keeper_id), Some(habitat_id))).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("maximum capacity"));
}

#[tokio::test]
async fn missing_animal_is_not_found() {
    let base = spawn_test_server().await;
    let resp = reqwest::get(format!("{}/api/animals/999", base)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_error_body(&body, 404);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let base = spawn_test_server().await;
    let client = Client::new();

    let (status, body) = post(
        &client,
        format!("{}/api/animals", base),
        json!({"name": "Simba"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, 400);
}

#[tokio::test]
async fn keeper_in_use_cannot_be_deleted() {
    let base = spawn_test_server().await;
    let client = Client::new();
    let keeper_id = create_keeper(&client, &base, "ana@zoo.example").await;
    let (_, animal) = post(
        &client,
        format!("{}/api/animals", base),
        animal_body("Simba", Some(keeper_id), None),
    )
    .await;

    let resp = client
        .delete(format!("{}/api/cuidadores/{}", base, keeper_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.unwrap();
    assert_error_body(&body, 409);

    client
        .delete(format!("{}/api/animals/{}", base, animal["id"]))
        .send()
        .await
        .unwrap();
    let resp = client
        .delete(format!("{}/api/cuidadores/{}", base, keeper_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn duplicate_keeper_contact_is_bad_request() {
    let base = spawn_test_server().await;
    let client = Client::new();
    create_keeper(&client, &base, "ana@zoo.example").await;

    let (status, body) = post(
        &client,
        format!("{}/api/cuidadores", base),
        keeper_body("ana@zoo.example"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, 400);
}

#[tokio::test]
async fn list_endpoints_apply_query_filters() {
    let base = spawn_test_server().await;
    let client = Client::new();
    let keeper_id = create_keeper(&client, &base, "ana@zoo.example").await;
    create_habitat(&client, &base, 4).await;

    let mut old_lion = animal_body("Mufasa", Some(keeper_id), None);
    old_lion["age"] = json!(15);
    post(&client, format!("{}/api/animals", base), old_lion).await;
    post(&client, format!("{}/api/animals", base), animal_body("Simba", Some(keeper_id), None)).await;

    let animals: Vec<Value> = client
        .get(format!("{}/api/animals?species=Lion&ageMin=10", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(animals.len(), 1);
    assert_eq!(animals[0]["name"], "Mufasa");

    let habitats: Vec<Value> = client
        .get(format!("{}/api/habitats?type=Aquatic", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(habitats.is_empty());

    let resp = client
        .get(format!("{}/api/animals?ageMin=old", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn feeding_plan_lookup_by_animal() {
    let base = spawn_test_server().await;
    let client = Client::new();
    let keeper_id = create_keeper(&client, &base, "ana@zoo.example").await;

    let (status, plan) = post(
        &client,
        format!("{}/api/alimentacoes", base),
        json!({"planName": "Carnivore", "foodType": "Meat", "quantity": "5kg", "frequency": "Daily"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut simba = animal_body("Simba", Some(keeper_id), None);
    simba["feedingPlanId"] = plan["id"].clone();
    let (_, animal) = post(&client, format!("{}/api/animals", base), simba).await;

    let plans: Vec<Value> = client
        .get(format!("{}/api/alimentacoes?animalId={}", base, animal["id"]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0]["planName"], "Carnivore");

    let resp = client
        .delete(format!("{}/api/alimentacoes/{}", base, plan["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn vet_license_must_be_unique() {
    let base = spawn_test_server().await;
    let client = Client::new();
    let vet = json!({"name": "Dr. Lima", "crmv": "SP-1234", "specialty": "Exotic", "status": "Active"});

    let (first, _) = post(&client, format!("{}/api/veterinarios", base), vet.clone()).await;
    let (second, _) = post(&client, format!("{}/api/veterinarios", base), vet).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_numeric_id_gets_json_error_body() {
    let base = spawn_test_server().await;
    let client = Client::new();

    for url in [
        format!("{}/api/animals/simba", base),
        format!("{}/api/cuidadores/ana", base),
        format!("{}/api/habitats/savana", base),
        format!("{}/api/veterinarios/x1", base),
        format!("{}/api/alimentacoes/meat", base),
    ] {
        let resp = client.get(&url).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", url);
        let body: Value = resp.json().await.unwrap();
        assert_error_body(&body, 400);
    }

    let resp = client
        .delete(format!("{}/api/animals/not-a-number", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_error_body(&resp.json::<Value>().await.unwrap(), 400);
}
