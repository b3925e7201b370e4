use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use zoo_sanctuary::config::EmailConfig;
use zoo_sanctuary::core::locks::HabitatLocks;
use zoo_sanctuary::core::notification::NotificationDispatcher;
use zoo_sanctuary::domain::model::{AnimalDraft, Keeper, KeeperDraft};
use zoo_sanctuary::domain::ports::KeeperRepository;
use zoo_sanctuary::{AnimalReconciler, Mailer, SqliteStore};

fn email_config(server: &MockServer) -> EmailConfig {
    EmailConfig {
        enabled: true,
        endpoint: server.url("/emails"),
        api_key: Some("re_integration".to_string()),
        from: Some("Zoo <zoo@sanctuary.example>".to_string()),
        timeout_seconds: 2,
        retry_attempts: 2,
        retry_delay_ms: 1,
    }
}

async fn setup(server: &MockServer) -> (AnimalReconciler<SqliteStore, Mailer>, Keeper, Keeper) {
    let config = email_config(server);
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let mailer = Mailer::from_config(&config).unwrap();
    let dispatcher = NotificationDispatcher::new(mailer, config.dispatch_timeout());

    let mut keepers = Vec::new();
    for name in ["Ana", "Bruno"] {
        keepers.push(
            store
                .insert_keeper(&KeeperDraft {
                    name: name.to_string(),
                    contact: format!("{}@zoo.example", name.to_lowercase()),
                    specialty: "Felines".to_string(),
                    status: "Active".to_string(),
                    work_shift: "Morning".to_string(),
                })
                .await
                .unwrap(),
        );
    }
    let bruno = keepers.remove(1);
    let ana = keepers.remove(0);

    (
        AnimalReconciler::new(store, dispatcher, HabitatLocks::new()),
        ana,
        bruno,
    )
}

fn simba(keeper: &Keeper) -> AnimalDraft {
    AnimalDraft {
        name: "Simba".to_string(),
        species: "Lion".to_string(),
        age: 5,
        sex: "M".to_string(),
        arrival_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        status: "Healthy".to_string(),
        image: None,
        keeper_id: Some(keeper.id),
        vet_id: None,
        habitat_id: None,
        feeding_plan_id: None,
    }
}

#[tokio::test]
async fn create_sends_assignment_email_through_provider() {
    let server = MockServer::start_async().await;
    let assignment = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/emails")
                .header("Authorization", "Bearer re_integration")
                .json_body_partial(
                    json!({
                        "from": "Zoo <zoo@sanctuary.example>",
                        "to": ["ana@zoo.example"],
                        "subject": "Novo Animal Atribuído: Simba"
                    })
                    .to_string(),
                );
            then.status(200).json_body(json!({"id": "msg_1"}));
        })
        .await;

    let (reconciler, ana, _) = setup(&server).await;
    reconciler.create(simba(&ana)).await.unwrap();

    assignment.assert_async().await;
}

#[tokio::test]
async fn reassignment_emails_both_keepers() {
    let server = MockServer::start_async().await;
    let to_bruno = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/emails")
                .json_body_partial(json!({"to": ["bruno@zoo.example"]}).to_string());
            then.status(200).json_body(json!({"id": "msg_b"}));
        })
        .await;
    let to_ana = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/emails")
                .json_body_partial(json!({"to": ["ana@zoo.example"]}).to_string());
            then.status(200).json_body(json!({"id": "msg_a"}));
        })
        .await;

    let (reconciler, ana, bruno) = setup(&server).await;
    let created = reconciler.create(simba(&ana)).await.unwrap();
    reconciler.update(created.id, simba(&bruno)).await.unwrap();

    // Ana: assignment on create, unassignment on update.
    to_ana.assert_hits_async(2).await;
    to_bruno.assert_hits_async(1).await;
}

#[tokio::test]
async fn provider_outage_does_not_block_mutations() {
    let server = MockServer::start_async().await;
    let outage = server
        .mock_async(|when, then| {
            when.method(POST).path("/emails");
            then.status(500).body("internal error");
        })
        .await;

    let (reconciler, ana, _) = setup(&server).await;
    let created = reconciler.create(simba(&ana)).await.unwrap();
    reconciler.delete(created.id).await.unwrap();

    // Two notifications, each tried twice.
    outage.assert_hits_async(4).await;
    assert!(reconciler.get(created.id).await.is_err());
}

#[tokio::test]
async fn html_in_animal_name_is_escaped_in_email_body() {
    let server = MockServer::start_async().await;
    let escaped = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/emails")
                .body_contains("<b>&lt;script&gt;</b>");
            then.status(200).json_body(json!({"id": "msg_x"}));
        })
        .await;

    let (reconciler, ana, _) = setup(&server).await;
    let mut draft = simba(&ana);
    draft.name = "<script>".to_string();
    reconciler.create(draft).await.unwrap();

    escaped.assert_async().await;
}

#[tokio::test]
async fn disabled_email_never_calls_provider() {
    let server = MockServer::start_async().await;
    let any_call = server
        .mock_async(|when, then| {
            when.method(POST).path("/emails");
            then.status(200);
        })
        .await;

    let mut config = email_config(&server);
    config.enabled = false;
    let mailer = Mailer::from_config(&config).unwrap();
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let keeper = store
        .insert_keeper(&KeeperDraft {
            name: "Ana".to_string(),
            contact: "ana@zoo.example".to_string(),
            specialty: "Felines".to_string(),
            status: "Active".to_string(),
            work_shift: "Morning".to_string(),
        })
        .await
        .unwrap();
    let reconciler = AnimalReconciler::new(
        store,
        NotificationDispatcher::new(mailer, Duration::from_secs(1)),
        HabitatLocks::new(),
    );

    reconciler.create(simba(&keeper)).await.unwrap();
    any_call.assert_hits_async(0).await;
}
