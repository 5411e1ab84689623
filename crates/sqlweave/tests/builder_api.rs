//! Builder behavior through the public API, against an in-memory connection.

use sqlweave::{
    Connection, ConditionNode, Dialect, Operator, QueryResult, Record, Value, WeaveError,
    WeaveResult, raw,
};
use std::sync::Mutex;

#[derive(Default)]
struct MemoryConnection {
    log: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MemoryConnection {
    fn log(&self) -> Vec<(String, Vec<Value>)> {
        self.log.lock().unwrap().clone()
    }
}

impl Connection for MemoryConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> WeaveResult<QueryResult> {
        self.log
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        let row: Record = [("affected_sql", Value::from(sql))].into_iter().collect();
        Ok(QueryResult::new(params.len() as u64, vec![row]))
    }

    fn in_transaction(&self) -> bool {
        false
    }

    async fn begin_transaction(&self) -> WeaveResult<()> {
        Ok(())
    }

    async fn commit_transaction(&self) -> WeaveResult<()> {
        Ok(())
    }

    async fn rollback_transaction(&self) -> WeaveResult<()> {
        Err(WeaveError::Transaction("not supported".to_string()))
    }
}

#[tokio::test]
async fn upsert_round_trip() {
    let conn = MemoryConnection::default();
    let mut query = conn.create_query();
    query
        .insert("counters")
        .values_many([
            [("id", Value::from(1)), ("hits", Value::from(1))],
            [("id", Value::from(2)), ("hits", Value::from(1))],
        ])
        .conflict(["id"])
        .do_update()
        .set("hits", raw("counters.hits + EXCLUDED.hits"))
        .returning(["id", "hits"]);

    let result = query.execute().await.unwrap();
    assert_eq!(result.affected(), 4);

    let log = conn.log();
    assert_eq!(log.len(), 1);
    assert_eq!(
        log[0].0,
        "INSERT INTO counters (hits, id) VALUES (?, ?), (?, ?) ON CONFLICT (id) DO UPDATE \
         SET hits = counters.hits + EXCLUDED.hits RETURNING id, hits"
    );
    assert_eq!(
        log[0].1,
        vec![Value::Int(1), Value::Int(1), Value::Int(1), Value::Int(2)]
    );
}

#[tokio::test]
async fn placeholders_match_params() {
    let conn = MemoryConnection::default();
    let mut query = conn.create_query();
    query
        .select(["o.id", "sum(i.total)"])
        .from(["orders o"])
        .inner_join("items i", "i.order_id = o.id")
        .where_("o.status", Operator::In, ["open", "paid"])
        .where_group([
            ConditionNode::compare("o.region", Operator::Eq, "eu"),
            ConditionNode::compare("o.priority", Operator::Gte, 3).or(),
        ])
        .group_by(["o.id"])
        .having("sum(i.total)", Operator::Gt, 100.5)
        .limit(25)
        .offset(50);

    let stmt = query.compile().unwrap();
    assert_eq!(stmt.placeholder_count(), stmt.params().len());
    assert_eq!(stmt.params().len(), 7);

    let (sql, params) = stmt.into_parts();
    query.execute().await.unwrap();
    assert_eq!(conn.log(), vec![(sql, params)]);
}

#[test]
fn compile_errors_are_classified() {
    let conn = MemoryConnection::default();
    let mut query = conn.create_query();
    query
        .select(["id"])
        .from(["t"])
        .where_("id", Operator::In, Vec::<i64>::new());

    let err = query.compile().unwrap_err();
    assert!(err.is_compile_error());
    assert!(matches!(err, WeaveError::InvalidClause { clause: "where", .. }));
}
