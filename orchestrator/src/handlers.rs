use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use common::{StatusResponse, WordCountRequest, WordCountResult};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::error::{ClusterHealthError, PipelineError};
use crate::pipeline;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(cluster_status))
        .route("/api/wordcount", post(wordcount))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

// Liveness del propio orquestador (no consulta el cluster)
async fn health() -> &'static str {
    "ok"
}

async fn cluster_status(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ClusterHealthError> {
    match state.cluster.health().await {
        Ok(()) => Ok(Json(StatusResponse::running())),
        Err(e) => {
            warn!("cluster no saludable: {}", e);
            Err(e)
        }
    }
}

// Corre un WordCount completo y responde con el resultado agregado.
// El job corre en su propia tarea: si el cliente corta, igual limpia.
async fn wordcount(
    State(state): State<AppState>,
    payload: Result<Json<WordCountRequest>, JsonRejection>,
) -> Result<Json<WordCountResult>, PipelineError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("wordcount con cuerpo inválido: {}", rejection.body_text());
        PipelineError::from(rejection)
    })?;

    info!("wordcount pedido ({} bytes)", req.text.len());
    let result =
        pipeline::spawn_wordcount(state.cluster.clone(), state.config.clone(), req.text).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrchestratorConfig;
    use crate::testing::{FakeCluster, Stage};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::{sync::Arc, time::Duration};
    use tower::ServiceExt;

    fn app(cluster: FakeCluster) -> Router {
        build_router(AppState::new(
            Arc::new(cluster),
            OrchestratorConfig::default(),
        ))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_wordcount(body: Value) -> Request<Body> {
        Request::post("/api/wordcount")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_responde_ok() {
        let resp = app(FakeCluster::counting()).oneshot(get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn status_con_cluster_sano() {
        let (status, body) = send(app(FakeCluster::counting()), get("/api/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "running", "message": "Cluster is healthy"})
        );
    }

    #[tokio::test]
    async fn status_con_cluster_caido_incluye_stderr() {
        let cluster = FakeCluster::counting().not_responding("Connection refused");
        let (status, body) = send(app(cluster), get("/api/status")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "status": "error",
                "message": "Cluster not responding",
                "stderr": "Connection refused",
            })
        );
    }

    #[tokio::test]
    async fn status_con_chequeo_fallido_no_incluye_stderr() {
        let cluster = FakeCluster::counting().check_failing("timeout de 10s");
        let (status, body) = send(app(cluster), get("/api/status")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"status": "error", "message": "timeout de 10s"}));
    }

    #[tokio::test]
    async fn wordcount_devuelve_resultado_agregado() {
        let (status, body) = send(
            app(FakeCluster::counting()),
            post_wordcount(json!({"text": "the quick brown fox the lazy dog the"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["word_counts"],
            json!({"the": 3, "quick": 1, "brown": 1, "fox": 1, "lazy": 1, "dog": 1})
        );
        assert_eq!(body["total_words"], 8);
        assert_eq!(body["unique_words"], 6);
        assert_eq!(body["job_id"].as_str().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn wordcount_texto_vacio_es_400_sin_comandos() {
        let cluster = FakeCluster::counting();
        let (status, body) = send(app(cluster.clone()), post_wordcount(json!({"text": ""}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No text provided"}));
        assert!(cluster.stages().is_empty());
        assert!(cluster.deletions().is_empty());
        assert!(cluster.last_job_id().is_none());
    }

    #[tokio::test]
    async fn wordcount_fallo_de_hadoop_es_500_con_returncode() {
        let cluster = FakeCluster::counting().failing_at(Stage::Run);
        let (status, body) = send(app(cluster.clone()), post_wordcount(json!({"text": "hola"}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Hadoop error: Streaming Command Failed!", "returncode": 1})
        );
        assert_eq!(cluster.deletions().len(), 4);
    }

    #[tokio::test]
    async fn wordcount_salida_invalida_es_500_con_tipo() {
        let cluster = FakeCluster::with_output("hola\tmucho\n");
        let (status, body) = send(app(cluster), post_wordcount(json!({"text": "hola"}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["type"], "CollectionError");
        assert!(body.get("returncode").is_none());
    }

    #[tokio::test]
    async fn wordcount_sin_campo_text_es_json_de_validacion() {
        let cluster = FakeCluster::counting();
        let (status, body) = send(app(cluster.clone()), post_wordcount(json!({}))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["type"], "ValidationError");
        assert!(body["error"].as_str().unwrap().contains("text"));
        assert!(cluster.stages().is_empty());
    }

    #[tokio::test]
    async fn wordcount_cuerpo_no_json_es_400_con_tipo() {
        let req = Request::post("/api/wordcount")
            .header("content-type", "application/json")
            .body(Body::from("esto no es json"))
            .unwrap();
        let (status, body) = send(app(FakeCluster::counting()), req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["type"], "ValidationError");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn wordcount_sin_content_type_es_415_con_tipo() {
        let req = Request::post("/api/wordcount")
            .body(Body::from(r#"{"text": "hola"}"#))
            .unwrap();
        let (status, body) = send(app(FakeCluster::counting()), req).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["type"], "ValidationError");
    }

    #[tokio::test]
    async fn wordcount_cliente_desconectado_igual_termina_y_limpia() {
        let cluster = FakeCluster::counting().slow_run(Duration::from_millis(200));

        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            app(cluster.clone()).oneshot(post_wordcount(json!({"text": "hola mundo"}))),
        )
        .await;
        assert!(abandoned.is_err());

        assert!(cluster.wait_for_deletions(4).await);
        assert_eq!(
            cluster.stages(),
            vec![Stage::Stage, Stage::Run, Stage::Read]
        );
    }
}
