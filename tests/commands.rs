mod common;

use reviewbot::{
    app::App,
    config::{BotConfig, load_config, save_config},
    domain::ReviewLanguage,
    event::ReviewEvent,
};
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

struct Fixture {
    dir: TempDir,
    server: MockServer,
}

impl Fixture {
    async fn new() -> Self {
        Self { dir: tempfile::tempdir().unwrap(), server: MockServer::start().await }
    }

    fn config_path(&self) -> std::path::PathBuf {
        self.dir.path().join("config.json")
    }

    fn config(&self) -> BotConfig {
        BotConfig {
            token: "tok".into(),
            api_url: self.server.uri().into(),
            languages: vec![ReviewLanguage::English],
            desktop_notifications: false,
            ..Default::default()
        }
    }

    fn app(&self, config: BotConfig) -> (App, std::sync::mpsc::Receiver<ReviewEvent>) {
        let (sender, receiver) = common::channel();
        (App::new(self.config_path(), config, sender), receiver)
    }

    async fn mount_certifications(&self, times: u64) {
        Mock::given(method("GET"))
            .and(path("/me/certifications/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(common::certifications()))
            .expect(times)
            .mount(&self.server)
            .await;
    }
}

#[tokio::test]
async fn certs_update_keeps_only_certified_projects_and_saves_them() {
    let fx = Fixture::new().await;
    fx.mount_certifications(1).await;
    let (mut app, _events) = fx.app(fx.config());

    let certs = app.certs(true).await.unwrap().to_vec();
    assert_eq!(
        certs,
        vec![common::cert("Dog Breed Classifier", 145), common::cert("Finding Donors", 147)]
    );

    let saved = load_config(&fx.config_path()).unwrap();
    assert_eq!(saved.certified, certs);
    assert_eq!(saved.token, "tok");
}

#[tokio::test]
async fn certs_without_update_uses_the_stored_list() {
    let fx = Fixture::new().await;
    fx.mount_certifications(0).await;
    let config = BotConfig { certified: vec![common::cert("Stored", 1)], ..fx.config() };
    let (mut app, _events) = fx.app(config);

    let certs = app.certs(false).await.unwrap();
    assert_eq!(certs, [common::cert("Stored", 1)]);
    assert!(!fx.config_path().exists());
}

#[tokio::test]
async fn certs_are_fetched_when_none_are_stored() {
    let fx = Fixture::new().await;
    fx.mount_certifications(1).await;
    let (mut app, _events) = fx.app(fx.config());

    assert_eq!(app.certs(false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn assigned_reports_each_submission() {
    let fx = Fixture::new().await;
    Mock::given(method("GET"))
        .and(path("/me/submissions/assigned/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            common::submission(1, "Dog Breed Classifier", "en-us"),
            common::submission(2, "Finding Donors", "zh-cn"),
        ])))
        .mount(&fx.server)
        .await;
    let (app, events) = fx.app(fx.config());

    let assigned = app.assigned().await.unwrap();
    assert_eq!(assigned.len(), 2);

    let events: Vec<_> = events.try_iter().collect();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| matches!(e, ReviewEvent::CurrentlyAssigned(_))));
}

#[tokio::test]
async fn nothing_assigned_is_reported() {
    let fx = Fixture::new().await;
    Mock::given(method("GET"))
        .and(path("/me/submissions/assigned/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&fx.server)
        .await;
    let (app, events) = fx.app(fx.config());

    assert!(app.assigned().await.unwrap().is_empty());
    assert!(matches!(events.try_recv(), Ok(ReviewEvent::NothingAssigned)));
}

#[tokio::test]
async fn review_refreshes_missing_certifications_then_claims() {
    let fx = Fixture::new().await;
    fx.mount_certifications(1).await;
    for project in [145, 147] {
        Mock::given(method("POST"))
            .and(path(format!("/projects/{project}/submissions/assign")))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&fx.server)
            .await;
    }
    let (mut app, _events) = fx.app(fx.config());

    let summary = app.review().await.unwrap();
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.claimed, 0);
}

#[tokio::test]
async fn review_without_token_fails_before_any_request() {
    let fx = Fixture::new().await;
    fx.mount_certifications(0).await;
    let config = BotConfig { token: "".into(), ..fx.config() };
    let (mut app, _events) = fx.app(config);

    assert!(app.review().await.is_err());
}

#[tokio::test]
async fn claim_poller_covers_every_credential() {
    let fx = Fixture::new().await;
    let config = BotConfig {
        tokens: vec!["second".into(), "third".into()],
        certified: vec![common::cert("Stored", 1)],
        ..fx.config()
    };
    save_config(&fx.config_path(), &config).unwrap();
    let (mut app, _events) = fx.app(load_config(&fx.config_path()).unwrap());

    Mock::given(method("POST"))
        .and(path("/projects/1/submissions/assign"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&fx.server)
        .await;

    let poller = app.claim_poller(30).await.unwrap();
    assert_eq!(poller.interval().as_secs(), 30);
    assert_eq!(poller.run_round().await.len(), 3);
}

#[tokio::test]
async fn submissions_and_feedbacks_are_listed() {
    let fx = Fixture::new().await;
    Mock::given(method("GET"))
        .and(path("/me/submissions/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([common::submission(9, "Smartcab", "en-us")])),
        )
        .mount(&fx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/student_feedbacks/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{ "rating": 5, "body": "thanks" }])),
        )
        .mount(&fx.server)
        .await;
    let (app, _events) = fx.app(fx.config());

    let submissions = app.submissions().await.unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].project_name(), Some("Smartcab"));

    let feedbacks = app.feedbacks().await.unwrap();
    assert_eq!(feedbacks[0]["rating"], 5);
}
