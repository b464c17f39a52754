mod common;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{any, post};
use axum::{Json, Router};
use common::{harness_with, StaticResolver};
use flow_rs::{Action, ActionServices, Flow, FlowDispatcher, FlowStore};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Received = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

async fn receive(State(received): State<Received>, headers: HeaderMap, Json(body): Json<Value>) {
    received.lock().unwrap().push((headers, body));
}

/// 本地 webhook 接收端
async fn spawn_receiver() -> (SocketAddr, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
        .route("/hook", post(receive))
        .with_state(received.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, received)
}

async fn harness_for(addr: SocketAddr, resolved_to: &'static str) -> common::Harness {
    harness_with(
        |mut config| {
            config.allowed_webhook_domains = vec!["hooks.test".to_string()];
            config
        },
        move |services| {
            // 请求实际发往本地接收端,校验只看解析器返回的地址
            let client = ActionServices::http_client_builder(&services.config)
                .no_proxy()
                .resolve("hooks.test", addr)
                .build()
                .unwrap();
            services
                .with_resolver(Arc::new(
                    StaticResolver::default().with("hooks.test", &[resolved_to]),
                ))
                .with_http_client(client)
        },
    )
    .await
}

#[test_log::test(tokio::test)]
async fn webhook_posts_rendered_body_and_headers() {
    let (addr, received) = spawn_receiver().await;
    let h = harness_for(addr, "93.184.216.34").await;

    let flow = Flow::new("Notify", "gift")
        .with_action(Action::new(
            "webhook",
            json!({
                "url": format!("http://hooks.test:{}/hook", addr.port()),
                "body": { "content": "{username} sent {gift_name}", "coins": "{coins}" },
                "headers": { "X-Streamer": "{nickname}" }
            }),
        ))
        .with_action(Action::new(
            "http_request",
            json!({
                "url": format!("http://hooks.test:{}/hook", addr.port()),
                "payload": "{\"who\": \"{username}\"}"
            }),
        ));
    h.store.save_flow(flow).await.unwrap();

    h.engine
        .process_event(
            "gift",
            json!({ "uniqueId": "mia", "nickname": "Mia", "giftName": "Galaxy", "coins": 1000 }),
        )
        .await
        .unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 2);

    let (headers, body) = &received[0];
    assert_eq!(body, &json!({ "content": "mia sent Galaxy", "coins": "1000" }));
    assert_eq!(headers.get("x-streamer").unwrap(), "Mia");
    assert_eq!(received[1].1, json!({ "who": "mia" }));
}

#[test_log::test(tokio::test)]
async fn webhook_resolving_to_private_address_is_not_sent() {
    let (addr, received) = spawn_receiver().await;
    let h = harness_for(addr, "10.0.0.8").await;

    let flow = Flow::new("Rebound", "chat")
        .with_action(Action::new(
            "webhook",
            json!({ "url": format!("http://hooks.test:{}/hook", addr.port()) }),
        ))
        .with_action(Action::new("alert", json!({ "text": "after webhook" })));
    h.store.save_flow(flow).await.unwrap();

    h.engine.process_event("chat", json!({})).await.unwrap();

    assert!(received.lock().unwrap().is_empty());
    assert_eq!(h.alerts.texts(), vec!["after webhook".to_string()]);
}

#[test_log::test(tokio::test)]
async fn webhook_outside_allow_list_is_not_sent() {
    let (addr, received) = spawn_receiver().await;
    let h = harness_for(addr, "93.184.216.34").await;

    let flow = Flow::new("Sneaky", "chat").with_action(Action::new(
        "webhook",
        json!({ "url": format!("http://evil.hooks.test:{}/hook", addr.port()) }),
    ));
    h.store.save_flow(flow).await.unwrap();

    h.engine.process_event("chat", json!({})).await.unwrap();
    assert!(received.lock().unwrap().is_empty());
}

/// 内网服务: 只统计被访问次数
async fn spawn_internal_service() -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/secret",
        any(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                "secret"
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, hits)
}

/// 白名单主机把请求重定向到内网地址
async fn spawn_redirecting_receiver(target: String) -> SocketAddr {
    let app = Router::new().route(
        "/hook",
        any(move || {
            let target = target.clone();
            async move { (StatusCode::FOUND, [(header::LOCATION, target)]).into_response() }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[test_log::test(tokio::test)]
async fn webhook_does_not_follow_redirect_into_internal_address() {
    let (internal, hits) = spawn_internal_service().await;
    let addr = spawn_redirecting_receiver(format!("http://127.0.0.1:{}/secret", internal.port())).await;
    let h = harness_for(addr, "93.184.216.34").await;

    let flow = Flow::new("Redirected", "gift")
        .with_action(Action::new(
            "webhook",
            json!({ "url": format!("http://hooks.test:{}/hook", addr.port()) }),
        ))
        .with_action(Action::new("alert", json!({ "text": "after redirect" })));
    h.store.save_flow(flow).await.unwrap();

    let runs = h.engine.process_event("gift", json!({ "coins": 1 })).await.unwrap();

    assert_eq!(runs[0].actions_attempted, 2);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(h.alerts.texts(), vec!["after redirect".to_string()]);
}

#[test_log::test(tokio::test)]
async fn engine_client_builder_does_not_follow_redirects() {
    let (internal, hits) = spawn_internal_service().await;
    let addr = spawn_redirecting_receiver(format!("http://127.0.0.1:{}/secret", internal.port())).await;
    let client = ActionServices::http_client_builder(&flow_rs::EngineConfig::default())
        .no_proxy()
        .build()
        .unwrap();

    let response = client
        .get(format!("http://{}/hook", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::FOUND);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
