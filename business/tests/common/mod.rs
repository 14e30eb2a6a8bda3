//! Mock-server test harness for the business commands.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rbacctl_business::{BusinessConfig, Role, UserRecord, UserStatus, build_console_ctx};
use rbacctl_states::StateCtx;
use ustr::Ustr;

/// A mock server plus a `StateCtx` configured to talk to it.
pub struct TestContext {
    pub mock_server: MockServer,
    pub ctx: StateCtx,
}

impl TestContext {
    pub async fn new() -> Self {
        let mock_server = MockServer::start().await;
        let config = BusinessConfig::new(mock_server.uri());
        let ctx = build_console_ctx(config).expect("console ctx builds");
        Self { mock_server, ctx }
    }

    /// Flush pending commands and wait for every spawned task, syncing
    /// compute updates as each one lands.
    pub async fn flush_and_wait(&mut self) {
        self.ctx.sync_computes();
        self.ctx.flush_commands();

        let timeout = Duration::from_secs(5);
        let start = std::time::Instant::now();

        while self.ctx.task_count() > 0 {
            assert!(
                start.elapsed() <= timeout,
                "timed out waiting for pending tasks ({} still in JoinSet)",
                self.ctx.task_count()
            );

            if self.ctx.task_set_mut().join_next().await.is_some() {
                self.ctx.sync_computes();
            }
        }

        self.ctx.sync_computes();
    }

    pub async fn shutdown(&mut self) {
        self.ctx.shutdown().await;
    }

    pub async fn mock_list_users(&self, users: &[UserRecord]) {
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(users))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_list_users_error(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_create_user(&self, created: &UserRecord) {
        Mock::given(method("POST"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(201).set_body_json(created))
            .mount(&self.mock_server)
            .await;
    }

    /// Mounted with `.expect(0)` so the server itself fails the test if any
    /// create request arrives.
    pub async fn expect_no_create_user(&self) {
        Mock::given(method("POST"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_update_user(&self, id: u64, updated: &UserRecord) {
        Mock::given(method("PUT"))
            .and(path(format!("/users/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_update_user_error(&self, id: u64, status: u16) {
        Mock::given(method("PUT"))
            .and(path(format!("/users/{id}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_delete_user(&self, id: u64) {
        Mock::given(method("DELETE"))
            .and(path(format!("/users/{id}")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_delete_user_error(&self, id: u64, status: u16) {
        Mock::given(method("DELETE"))
            .and(path(format!("/users/{id}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_list_roles(&self, roles: &[Role]) {
        Mock::given(method("GET"))
            .and(path("/roles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(roles))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_create_role(&self, created: &Role) {
        Mock::given(method("POST"))
            .and(path("/roles"))
            .respond_with(ResponseTemplate::new(201).set_body_json(created))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_update_role(&self, id: u64, updated: &Role) {
        Mock::given(method("PUT"))
            .and(path(format!("/roles/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_delete_role(&self, id: u64) {
        Mock::given(method("DELETE"))
            .and(path(format!("/roles/{id}")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.mock_server)
            .await;
    }
}

pub fn sample_user(id: u64, name: &str, email: &str, roles: &[&str]) -> UserRecord {
    UserRecord {
        id,
        name: name.to_owned(),
        email: email.to_owned(),
        roles: roles.iter().copied().map(Ustr::from).collect(),
        status: UserStatus::Active,
    }
}

pub fn sample_role(id: u64, name: &str, permissions: &[&str]) -> Role {
    Role {
        id,
        name: name.to_owned(),
        permissions: permissions.iter().copied().map(Ustr::from).collect(),
    }
}
