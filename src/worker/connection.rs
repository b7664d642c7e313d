//! Session-pinned [`Connection`] backed by the worker.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::IgnoredAny;
use tracing::{debug, warn};

use super::error::{WorkerError, WorkerResult};
use super::protocol::{
    self, methods, CloseSessionParams, ConnectionParams, OpenSessionParams, StatementParams,
};
use super::WorkerClient;
use crate::executor::{ColumnType, Connection, ExecError, ExecResult, Rows, Value};

/// One worker session, i.e. one leased physical database connection.
///
/// Every statement carries the session id, so engine session state such as
/// `LAST_QUERY_ID()` carries over from one call to the next even when the
/// worker pools connections.
///
/// Call [`close`](Self::close) when done. Dropping an open session schedules
/// a best-effort close on the current runtime.
pub struct WorkerConnection {
    client: Arc<WorkerClient>,
    session_id: String,
    closed: bool,
}

impl WorkerConnection {
    /// Open a new session on the worker.
    pub async fn open(
        client: Arc<WorkerClient>,
        driver: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> WorkerResult<Self> {
        let params = OpenSessionParams {
            connection: ConnectionParams {
                driver: driver.into(),
                connection_string: connection_string.into(),
            },
        };
        let driver = params.connection.driver.clone();

        let response: protocol::OpenSessionResponse =
            client.request(methods::OPEN_SESSION, params).await?;
        debug!(session = %response.session_id, %driver, "worker session opened");

        Ok(Self {
            client,
            session_id: response.session_id,
            closed: false,
        })
    }

    /// The worker-side session id.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Close the session and release its connection.
    pub async fn close(mut self) -> WorkerResult<()> {
        self.closed = true;
        let _: IgnoredAny = self
            .client
            .request(
                methods::CLOSE_SESSION,
                CloseSessionParams {
                    session_id: self.session_id.clone(),
                },
            )
            .await?;
        debug!(session = %self.session_id, "worker session closed");
        Ok(())
    }

    async fn statement<R>(&self, method: &str, sql: &str, args: &[Value]) -> ExecResult<R>
    where
        R: serde::de::DeserializeOwned,
    {
        debug!(session = %self.session_id, method, sql, args = args.len(), "statement");
        self.client
            .request(
                method,
                StatementParams {
                    session_id: &self.session_id,
                    sql,
                    args,
                },
            )
            .await
            .map_err(into_exec_error)
    }
}

/// Engine-reported failures become [`ExecError::Database`]; transport
/// failures stay [`ExecError::Worker`].
fn into_exec_error(err: WorkerError) -> ExecError {
    match err {
        WorkerError::Remote { code, message } => ExecError::Database { code, message },
        other => ExecError::Worker(other),
    }
}

#[async_trait]
impl Connection for WorkerConnection {
    async fn execute(&mut self, sql: &str, args: &[Value]) -> ExecResult<u64> {
        let response: protocol::ExecuteResponse =
            self.statement(methods::EXECUTE, sql, args).await?;
        Ok(response
            .rows_affected
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0))
    }

    async fn query(&mut self, sql: &str, args: &[Value]) -> ExecResult<Rows> {
        let response: protocol::QueryResponse = self.statement(methods::QUERY, sql, args).await?;
        Ok(response.into())
    }

    async fn column_types(&mut self, sql: &str, args: &[Value]) -> ExecResult<Vec<ColumnType>> {
        let response: protocol::ColumnTypesResponse =
            self.statement(methods::COLUMN_TYPES, sql, args).await?;
        Ok(response.columns)
    }
}

impl Drop for WorkerConnection {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let client = Arc::clone(&self.client);
        let session_id = std::mem::take(&mut self.session_id);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let result: WorkerResult<IgnoredAny> = client
                        .request(methods::CLOSE_SESSION, CloseSessionParams { session_id })
                        .await;
                    if let Err(e) = result {
                        warn!(error = %e, "failed to close dropped worker session");
                    }
                });
            }
            Err(_) => warn!(session = %session_id, "worker session dropped outside a runtime"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // Answers session.open with "s-42" and echoes the session id of each
    // sql.query back as a single text cell.
    const SESSION_WORKER: &str = r#"
        while read -r line; do
            id=$(printf '%s' "$line" | sed 's/.*"id":"\([^"]*\)".*/\1/')
            sid=$(printf '%s' "$line" | sed -n 's/.*"session_id":"\([^"]*\)".*/\1/p')
            case "$line" in
                *'"session.open"'*'"driver":"nope"'*)
                    printf '{"id":"%s","success":false,"error":{"code":"DRIVER_NOT_FOUND","message":"nope"}}\n' "$id" ;;
                *'"session.open"'*)
                    printf '{"id":"%s","success":true,"result":{"session_id":"s-42"}}\n' "$id" ;;
                *'"sql.execute"'*)
                    if [ "$sid" = s-42 ]; then
                        printf '{"id":"%s","success":true,"result":{"rows_affected":0}}\n' "$id"
                    else
                        printf '{"id":"%s","success":false,"error":{"code":"SESSION_NOT_FOUND","message":"%s"}}\n' "$id" "$sid"
                    fi ;;
                *'"sql.query"'*)
                    printf '{"id":"%s","success":true,"result":{"columns":[{"name":"session_id","data_type":"TEXT"}],"rows":[["%s"]]}}\n' "$id" "$sid" ;;
                *)
                    printf '{"id":"%s","success":true,"result":null}\n' "$id" ;;
            esac
        done
    "#;

    async fn session_worker() -> Arc<WorkerClient> {
        let args = ["-c".to_string(), SESSION_WORKER.to_string()];
        let client = WorkerClient::spawn_with_args_and_timeout("sh", &args, Duration::from_secs(5))
            .await
            .unwrap();
        Arc::new(client)
    }

    #[test]
    fn test_remote_errors_become_database_errors() {
        let err = into_exec_error(WorkerError::remote("002003", "Object does not exist"));
        match err {
            ExecError::Database { code, message } => {
                assert_eq!(code, "002003");
                assert_eq!(message, "Object does not exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_transport_errors_pass_through() {
        let err = into_exec_error(WorkerError::Timeout(30));
        assert!(matches!(err, ExecError::Worker(WorkerError::Timeout(30))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_statements_carry_session_id() {
        let mut conn = WorkerConnection::open(session_worker().await, "snowflake", "acct/db")
            .await
            .unwrap();
        assert_eq!(conn.session_id(), "s-42");

        conn.execute("SHOW PRIMARY KEYS IN TABLE ORDERS", &[])
            .await
            .unwrap();
        let rows = conn
            .query("SELECT * FROM TABLE(RESULT_SCAN(LAST_QUERY_ID()))", &[])
            .await
            .unwrap();
        assert_eq!(rows.columns, vec!["session_id".to_string()]);
        assert_eq!(rows.rows, vec![vec![serde_json::json!("s-42")]]);

        conn.close().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_open_unknown_driver() {
        let result = WorkerConnection::open(session_worker().await, "nope", "x").await;
        assert!(matches!(result, Err(WorkerError::DriverNotFound(_))));
    }
}
