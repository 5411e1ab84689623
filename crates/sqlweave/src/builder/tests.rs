use super::Builder;
use crate::condition::{ConditionNode, Operator};
use crate::connection::Connection;
use crate::error::WeaveError;
use crate::parts::{Direction, StatementKind};
use crate::raw::raw;
use crate::result::{QueryResult, Record};
use crate::testing::RecordingConnection;
use crate::value::Value;

#[test]
fn test_select_full() {
    let conn = RecordingConnection::new();
    let mut query = conn.create_query();
    query
        .select(["id", "name"])
        .from(["users"])
        .where_("status", Operator::Eq, "active")
        .or_where("role", Operator::In, vec!["admin", "owner"])
        .order_by("id", Direction::Desc)
        .limit(20);

    let stmt = query.compile().unwrap();
    assert_eq!(
        stmt.sql(),
        "SELECT id, name FROM users WHERE status = ? OR role IN (?, ?) ORDER BY id DESC LIMIT ?"
    );
    assert_eq!(
        stmt.params(),
        &[
            Value::from("active"),
            Value::from("admin"),
            Value::from("owner"),
            Value::Int(20)
        ]
    );
}

#[test]
fn test_select_join_group_having() {
    let conn = RecordingConnection::new();
    let mut query = Builder::new(&conn);
    query
        .select(["u.id", "count(p.id)"])
        .from(["users u"])
        .left_join("posts p", ("p.user_id", Operator::Eq, "u.id"))
        .group_by(["u.id"])
        .having("count(p.id)", Operator::Gt, 5)
        .order_by("u.id", Direction::Asc)
        .limit(10)
        .offset(20);

    let stmt = query.compile().unwrap();
    assert_eq!(
        stmt.sql(),
        "SELECT u.id, count(p.id) FROM users u LEFT JOIN posts p ON p.user_id = u.id \
         GROUP BY u.id HAVING count(p.id) > ? ORDER BY u.id ASC LIMIT ? OFFSET ?"
    );
    assert_eq!(
        stmt.params(),
        &[Value::Int(5), Value::Int(10), Value::Int(20)]
    );
}

#[test]
fn test_where_groups() {
    let conn = RecordingConnection::new();
    let mut query = conn.create_query();
    query
        .select(["*"])
        .from(["t"])
        .where_("a", Operator::Eq, 1)
        .or_where_group([
            ConditionNode::compare("b", Operator::Eq, 2),
            ConditionNode::compare("c", Operator::Eq, 3).or(),
        ])
        .where_raw("deleted_at IS NULL");

    assert_eq!(
        query.compile().unwrap().sql(),
        "SELECT * FROM t WHERE a = ? OR (b = ? OR c = ?) AND deleted_at IS NULL"
    );
}

#[test]
fn test_upsert_do_update() {
    let conn = RecordingConnection::new();
    let mut query = conn.create_query();
    query
        .insert("users")
        .values([("id", Value::from(1)), ("name", Value::from("alice"))])
        .conflict(["id"])
        .do_update()
        .set("name", raw("EXCLUDED.name"))
        .returning(["id"]);

    let stmt = query.compile().unwrap();
    assert_eq!(
        stmt.sql(),
        "INSERT INTO users (id, name) VALUES (?, ?) ON CONFLICT (id) DO UPDATE \
         SET name = EXCLUDED.name RETURNING id"
    );
    assert_eq!(stmt.params(), &[Value::Int(1), Value::from("alice")]);
}

#[test]
fn test_multi_row_insert_do_nothing() {
    let conn = RecordingConnection::new();
    let mut query = conn.create_query();
    query
        .insert("tags")
        .values_many([
            [("name", Value::from("rust")), ("weight", Value::from(2))],
            [("weight", Value::from(1)), ("name", Value::from("sql"))],
        ])
        .conflict(Vec::<String>::new())
        .do_nothing();

    let stmt = query.compile().unwrap();
    assert_eq!(
        stmt.sql(),
        "INSERT INTO tags (name, weight) VALUES (?, ?), (?, ?) ON CONFLICT DO NOTHING"
    );
    assert_eq!(
        stmt.params(),
        &[
            Value::from("rust"),
            Value::Int(2),
            Value::from("sql"),
            Value::Int(1)
        ]
    );
}

#[test]
fn test_on_constraint() {
    let conn = RecordingConnection::new();
    let mut query = conn.create_query();
    query
        .insert("users")
        .values([("email", "a@example.com")])
        .on_constraint("users_email_key")
        .do_nothing();

    assert_eq!(
        query.compile().unwrap().sql(),
        "INSERT INTO users (email) VALUES (?) ON CONFLICT ON CONSTRAINT users_email_key DO NOTHING"
    );
}

#[test]
fn test_update_from() {
    let conn = RecordingConnection::new();
    let mut query = conn.create_query();
    query
        .update(["users"])
        .set("name", "bob")
        .set("hits", raw("hits + 1"))
        .from(["teams"])
        .where_raw("users.team_id = teams.id")
        .where_("teams.id", Operator::Eq, 3)
        .returning(["users.id"]);

    let stmt = query.compile().unwrap();
    assert_eq!(
        stmt.sql(),
        "UPDATE users SET name = ?, hits = hits + 1 FROM teams \
         WHERE users.team_id = teams.id AND teams.id = ? RETURNING users.id"
    );
    assert_eq!(stmt.params(), &[Value::from("bob"), Value::Int(3)]);
}

#[test]
fn test_delete_using() {
    let conn = RecordingConnection::new();
    let mut query = conn.create_query();
    query
        .delete(["orders"])
        .using(["customers"])
        .where_raw("orders.customer_id = customers.id")
        .where_("customers.banned", Operator::Eq, true);

    let stmt = query.compile().unwrap();
    assert_eq!(
        stmt.sql(),
        "DELETE FROM orders USING customers WHERE orders.customer_id = customers.id \
         AND customers.banned = ?"
    );
    assert_eq!(stmt.params(), &[Value::Bool(true)]);
}

#[test]
fn test_kind_switch_emits_only_registered_clauses() {
    let conn = RecordingConnection::new();
    let mut query = conn.create_query();
    query
        .select(["id"])
        .from(["t"])
        .order_by("id", Direction::Asc)
        .where_("id", Operator::Eq, 9)
        .delete(["t"]);

    assert_eq!(query.kind(), StatementKind::Delete);
    assert_eq!(query.compile().unwrap().sql(), "DELETE FROM t WHERE id = ?");

    // The select data is still there when switching back.
    query.select(Vec::<String>::new());
    assert_eq!(
        query.compile().unwrap().sql(),
        "SELECT id FROM t WHERE id = ? ORDER BY id ASC"
    );
}

#[test]
fn test_compile_is_idempotent() {
    let conn = RecordingConnection::new();
    let mut query = conn.create_query();
    query
        .select(["id"])
        .from(["t"])
        .where_("id", Operator::In, [1, 2, 3])
        .limit(1);

    let first = query.compile().unwrap();
    let second = query.compile().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.placeholder_count(), first.params().len());
}

#[test]
fn test_missing_required_clauses() {
    let conn = RecordingConnection::new();

    let query = conn.create_query();
    let err = query.compile().unwrap_err();
    assert!(matches!(
        err,
        WeaveError::MissingClause {
            kind: "SELECT",
            clause: "select"
        }
    ));

    let mut query = conn.create_query();
    query.insert("t");
    let err = query.compile().unwrap_err();
    assert_eq!(err.to_string(), "INSERT statement requires a values clause");

    let mut query = conn.create_query();
    query.update(["t"]).where_("id", Operator::Eq, 1);
    assert!(query.compile().unwrap_err().is_compile_error());

    let mut query = conn.create_query();
    query.delete(["t"]);
    assert_eq!(query.compile().unwrap().sql(), "DELETE FROM t");
}

#[test]
fn test_compile_error_leaves_parts_untouched() {
    let conn = RecordingConnection::new();
    let mut query = conn.create_query();
    query.insert("t").values_many([
        vec![("a", Value::from(1)), ("b", Value::from(2))],
        vec![("a", Value::from(3))],
    ]);

    let before = query.parts().clone();
    let err = query.compile().unwrap_err();
    assert!(matches!(err, WeaveError::InvalidClause { clause: "values", .. }));
    assert_eq!(query.parts(), &before);
}

#[test]
fn test_reset_keeps_kind() {
    let conn = RecordingConnection::new();
    let mut query = conn.create_query();
    query.insert("t").values([("a", 1)]).returning(["a"]);

    query.reset();
    assert_eq!(query.kind(), StatementKind::Insert);
    assert!(query.parts().is_empty());

    query.insert("u").values([("b", 2)]);
    assert_eq!(query.compile().unwrap().sql(), "INSERT INTO u (b) VALUES (?)");
}

#[test]
fn test_setters_replace_or_append() {
    let conn = RecordingConnection::new();
    let mut query = conn.create_query();
    query
        .select(["a"])
        .select(["b"])
        .from(["t"])
        .limit(5)
        .limit(10)
        .offset(1)
        .offset(2);

    let stmt = query.compile().unwrap();
    assert_eq!(stmt.sql(), "SELECT a, b FROM t LIMIT ? OFFSET ?");
    assert_eq!(stmt.params(), &[Value::Int(10), Value::Int(2)]);
}

#[tokio::test]
async fn test_execute_delegates_once() {
    let response = QueryResult::new(1, vec![Record::from_iter([("id", 42)])]);
    let conn = RecordingConnection::responding(response.clone());

    let mut query = conn.create_query();
    query
        .update(["users"])
        .set("name", "carol")
        .where_("id", Operator::Eq, 42)
        .returning(["id"]);

    let result = query.execute().await.unwrap();
    assert_eq!(result, response);

    let executed = conn.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(
        executed[0].0,
        "UPDATE users SET name = ? WHERE id = ? RETURNING id"
    );
    assert_eq!(executed[0].1, vec![Value::from("carol"), Value::Int(42)]);
}

#[tokio::test]
async fn test_execute_does_not_run_invalid_statement() {
    let conn = RecordingConnection::new();
    let mut query = conn.create_query();
    query.update(["users"]);

    assert!(query.execute().await.unwrap_err().is_compile_error());
    assert!(conn.executed().is_empty());
}

#[tokio::test]
async fn test_execute_returns_connection_error_unchanged() {
    let conn = RecordingConnection::failing();
    let mut query = conn.create_query();
    query.delete(["sessions"]).where_("expired", Operator::Eq, true);

    let err = query.execute().await.unwrap_err();
    assert!(matches!(err, WeaveError::Connection(ref msg) if msg == "connection reset"));
    assert_eq!(conn.executed().len(), 1);
}
