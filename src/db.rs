// src/db.rs

use crate::error::{Result, TrainlogError};
use crate::models::{parse_date, Level, Location, LogType, TrainingLog, User};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info, warn};

/// `training_logs` 的固定列顺序，导出表格也使用同一顺序
pub const LOG_COLUMNS: [&str; 22] = [
    "id",
    "username",
    "date",
    "duration",
    "location",
    "intensity",
    "satisfaction",
    "gudan_content",
    "p_swing",
    "p_live",
    "p_defense",
    "p_pitching",
    "p_running",
    "p_hanging",
    "p_etc",
    "coach_feedback",
    "self_good",
    "self_bad",
    "promise",
    "memo",
    "log_type",
    "tactical_image",
];

const SELECT_LOG: &str = "SELECT username, date, duration, location, intensity, satisfaction, \
    gudan_content, p_swing, p_live, p_defense, p_pitching, p_running, p_hanging, p_etc, \
    coach_feedback, self_good, self_bad, promise, memo, log_type, tactical_image \
    FROM training_logs";

/// 打开已有的数据库；文件不存在时返回 Unavailable 而不是创建空库
pub fn open_connection(db_path: &Path) -> Result<Connection> {
    if !db_path.exists() {
        return Err(TrainlogError::Unavailable(format!(
            "no database at {}",
            db_path.display()
        )));
    }
    debug!(path = %db_path.display(), "Opening database");
    Connection::open(db_path).map_err(TrainlogError::Sql)
}

/// 初始化数据库文件，如果表不存在则创建
pub fn initialize_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(db_path)?;
    create_schema(&conn)?;
    info!(path = %db_path.display(), "Database initialized");
    Ok(())
}

pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            username TEXT PRIMARY KEY,
            password TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS training_logs (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL,
            date TEXT NOT NULL,
            duration INTEGER DEFAULT 0,
            location TEXT DEFAULT '',
            intensity TEXT DEFAULT '',
            satisfaction TEXT DEFAULT '',
            gudan_content TEXT DEFAULT '',
            p_swing INTEGER DEFAULT 0,
            p_live INTEGER DEFAULT 0,
            p_defense INTEGER DEFAULT 0,
            p_pitching INTEGER DEFAULT 0,
            p_running INTEGER DEFAULT 0,
            p_hanging INTEGER DEFAULT 0,
            p_etc TEXT DEFAULT '',
            coach_feedback TEXT DEFAULT '',
            self_good TEXT DEFAULT '',
            self_bad TEXT DEFAULT '',
            promise TEXT DEFAULT '',
            memo TEXT DEFAULT '',
            log_type TEXT NOT NULL DEFAULT 'daily',
            tactical_image TEXT DEFAULT ''
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_training_logs_key
            ON training_logs (username, date, log_type);",
    )?;
    Ok(())
}

/// 表不存在说明尚未执行 init：所有 SQL 调用都经过这里，统一归类为 Unavailable
fn store_error(err: rusqlite::Error) -> TrainlogError {
    match &err {
        rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.starts_with("no such table") => {
            TrainlogError::Unavailable(msg.clone())
        }
        _ => TrainlogError::Sql(err),
    }
}

// ---------- users ----------

/// 按用户名精确查找用户（区分大小写和空白）
pub fn get_user(conn: &Connection, username: &str) -> Result<Option<User>> {
    conn.query_row(
        "SELECT username, password FROM users WHERE username = ?1",
        [username],
        |row| {
            Ok(User {
                username: row.get(0)?,
                password: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(store_error)
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn
        .prepare("SELECT username, password FROM users ORDER BY username")
        .map_err(store_error)?;
    let users = stmt
        .query_map([], |row| {
            Ok(User {
                username: row.get(0)?,
                password: row.get(1)?,
            })
        })
        .map_err(store_error)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(store_error)?;
    Ok(users)
}

pub fn add_user(conn: &Connection, username: &str, password: &str) -> Result<()> {
    if username.is_empty() {
        return Err(TrainlogError::InvalidInput("Username must not be empty".to_string()));
    }
    if get_user(conn, username)?.is_some() {
        return Err(TrainlogError::UserExists(username.to_string()));
    }
    conn.execute(
        "INSERT INTO users (username, password) VALUES (?1, ?2)",
        params![username, password],
    )
    .map_err(store_error)?;
    info!(username = %username, "User added");
    Ok(())
}

/// 删除用户；返回是否真的删除了一行。该用户的训练日志保留
pub fn delete_user(conn: &Connection, username: &str) -> Result<bool> {
    let count = conn
        .execute("DELETE FROM users WHERE username = ?1", [username])
        .map_err(store_error)?;
    info!(username = %username, removed = count, "User delete requested");
    Ok(count > 0)
}

// ---------- training logs ----------

/// 数据库中的原始行；手工编辑过的表里每一列都可能是任意值
struct DbTrainingLog {
    username: String,
    date: String,
    duration: i64,
    location: Option<String>,
    intensity: Option<String>,
    satisfaction: Option<String>,
    gudan_content: Option<String>,
    p_swing: i64,
    p_live: i64,
    p_defense: i64,
    p_pitching: i64,
    p_running: i64,
    p_hanging: i64,
    p_etc: Option<String>,
    coach_feedback: Option<String>,
    self_good: Option<String>,
    self_bad: Option<String>,
    promise: Option<String>,
    memo: Option<String>,
    log_type: Option<String>,
    tactical_image: Option<String>,
}

impl DbTrainingLog {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get(0)?,
            date: row.get(1)?,
            duration: coerce_metric(row.get(2)?),
            location: text_column(row.get(3)?),
            intensity: text_column(row.get(4)?),
            satisfaction: text_column(row.get(5)?),
            gudan_content: text_column(row.get(6)?),
            p_swing: coerce_metric(row.get(7)?),
            p_live: coerce_metric(row.get(8)?),
            p_defense: coerce_metric(row.get(9)?),
            p_pitching: coerce_metric(row.get(10)?),
            p_running: coerce_metric(row.get(11)?),
            p_hanging: coerce_metric(row.get(12)?),
            p_etc: text_column(row.get(13)?),
            coach_feedback: text_column(row.get(14)?),
            self_good: text_column(row.get(15)?),
            self_bad: text_column(row.get(16)?),
            promise: text_column(row.get(17)?),
            memo: text_column(row.get(18)?),
            log_type: text_column(row.get(19)?),
            tactical_image: text_column(row.get(20)?),
        })
    }
}

impl TryFrom<DbTrainingLog> for TrainingLog {
    type Error = TrainlogError;

    fn try_from(db: DbTrainingLog) -> Result<Self> {
        let date = parse_date(&db.date)?;
        let log_type = match db.log_type.as_deref() {
            None | Some("") => LogType::Daily,
            Some(s) => s.parse()?,
        };
        Ok(Self {
            username: db.username,
            date,
            log_type,
            duration: db.duration,
            location: Location::from_stored(db.location.as_deref().unwrap_or_default()),
            intensity: Level::from_stored(db.intensity.as_deref().unwrap_or_default()),
            satisfaction: Level::from_stored(db.satisfaction.as_deref().unwrap_or_default()),
            gudan_content: db.gudan_content.unwrap_or_default(),
            p_swing: db.p_swing,
            p_live: db.p_live,
            p_defense: db.p_defense,
            p_pitching: db.p_pitching,
            p_running: db.p_running,
            p_hanging: db.p_hanging,
            p_etc: db.p_etc.unwrap_or_default(),
            coach_feedback: db.coach_feedback.unwrap_or_default(),
            self_good: db.self_good.unwrap_or_default(),
            self_bad: db.self_bad.unwrap_or_default(),
            promise: db.promise.unwrap_or_default(),
            memo: db.memo.unwrap_or_default(),
            tactical_image: db.tactical_image.unwrap_or_default(),
        })
    }
}

/// 指标列统一转成整数：非数字或缺失一律视为 0
pub fn coerce_metric(value: Value) -> i64 {
    match value {
        Value::Integer(i) => i,
        Value::Real(f) if f.is_finite() => f as i64,
        Value::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn text_column(value: Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        _ => None,
    }
}

/// 按 (用户, 日期, 类型) 查找单条日志
pub fn get_log(
    conn: &Connection,
    username: &str,
    date: &str,
    log_type: LogType,
) -> Result<Option<TrainingLog>> {
    let query = format!(
        "{} WHERE username = ?1 AND date = ?2 AND log_type = ?3",
        SELECT_LOG
    );
    let raw = conn
        .query_row(&query, params![username, date, log_type.as_str()], DbTrainingLog::from_row)
        .optional()
        .map_err(store_error)?;
    raw.map(TrainingLog::try_from).transpose()
}

/// upsert_log 的结果：追加了新行还是覆盖了旧行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// 先按复合键查找，找到则整行覆盖，否则追加新行
pub fn upsert_log(conn: &Connection, log: &TrainingLog) -> Result<Upsert> {
    let date = log.date_str();
    let tx = conn.unchecked_transaction().map_err(store_error)?;

    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM training_logs WHERE username = ?1 AND date = ?2 AND log_type = ?3",
            params![log.username, date, log.log_type.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(store_error)?;

    let outcome = match existing {
        Some(id) => {
            tx.execute(
                "UPDATE training_logs SET
                    duration = ?1, location = ?2, intensity = ?3, satisfaction = ?4,
                    gudan_content = ?5, p_swing = ?6, p_live = ?7, p_defense = ?8,
                    p_pitching = ?9, p_running = ?10, p_hanging = ?11, p_etc = ?12,
                    coach_feedback = ?13, self_good = ?14, self_bad = ?15, promise = ?16,
                    memo = ?17, tactical_image = ?18
                 WHERE id = ?19",
                params![
                    log.duration,
                    log.location.as_str(),
                    log.intensity.as_str(),
                    log.satisfaction.as_str(),
                    log.gudan_content,
                    log.p_swing,
                    log.p_live,
                    log.p_defense,
                    log.p_pitching,
                    log.p_running,
                    log.p_hanging,
                    log.p_etc,
                    log.coach_feedback,
                    log.self_good,
                    log.self_bad,
                    log.promise,
                    log.memo,
                    log.tactical_image,
                    id,
                ],
            )
            .map_err(store_error)?;
            Upsert::Updated
        }
        None => {
            tx.execute(
                "INSERT INTO training_logs (
                    username, date, duration, location, intensity, satisfaction,
                    gudan_content, p_swing, p_live, p_defense, p_pitching, p_running,
                    p_hanging, p_etc, coach_feedback, self_good, self_bad, promise, memo,
                    log_type, tactical_image
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                           ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
                params![
                    log.username,
                    date,
                    log.duration,
                    log.location.as_str(),
                    log.intensity.as_str(),
                    log.satisfaction.as_str(),
                    log.gudan_content,
                    log.p_swing,
                    log.p_live,
                    log.p_defense,
                    log.p_pitching,
                    log.p_running,
                    log.p_hanging,
                    log.p_etc,
                    log.coach_feedback,
                    log.self_good,
                    log.self_bad,
                    log.promise,
                    log.memo,
                    log.log_type.as_str(),
                    log.tactical_image,
                ],
            )
            .map_err(store_error)?;
            Upsert::Inserted
        }
    };

    tx.commit().map_err(store_error)?;
    debug!(username = %log.username, date = %date, log_type = %log.log_type, outcome = ?outcome, "Log saved");
    Ok(outcome)
}

/// 列出所有日志，可按用户过滤；日期无法解析的行会被跳过并记录警告
pub fn list_logs(conn: &Connection, username: Option<&str>) -> Result<Vec<TrainingLog>> {
    let mut query = String::from(SELECT_LOG);
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(u) = username {
        query.push_str(" WHERE username = ?");
        params.push(Box::new(u.to_string()));
    }
    query.push_str(" ORDER BY date, username, log_type");

    let mut stmt = conn.prepare(&query).map_err(store_error)?;
    let rows = stmt
        .query_map(
            rusqlite::params_from_iter(params.iter().map(|b| b.as_ref())),
            DbTrainingLog::from_row,
        )
        .map_err(store_error)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(store_error)?;

    let logs = rows
        .into_iter()
        .filter_map(|raw| {
            let (user, date) = (raw.username.clone(), raw.date.clone());
            match TrainingLog::try_from(raw) {
                Ok(log) => Some(log),
                Err(e) => {
                    warn!(username = %user, date = %date, error = %e, "Skipping unreadable log row");
                    None
                }
            }
        })
        .collect();
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metric;
    use chrono::NaiveDate;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        create_schema(&conn).expect("schema");
        conn
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn count_rows(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM training_logs", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn upsert_twice_keeps_one_row_with_latest_values() {
        let conn = test_conn();
        let mut log = TrainingLog::new("kim", day("2024-06-03"), LogType::Daily);
        log.p_swing = 50;
        log.memo = "first".to_string();
        assert_eq!(upsert_log(&conn, &log).unwrap(), Upsert::Inserted);

        log.p_swing = 80;
        log.memo = "second".to_string();
        log.intensity = Level::Highest;
        assert_eq!(upsert_log(&conn, &log).unwrap(), Upsert::Updated);
        assert_eq!(upsert_log(&conn, &log).unwrap(), Upsert::Updated);

        assert_eq!(count_rows(&conn), 1);
        let stored = get_log(&conn, "kim", "2024-06-03", LogType::Daily)
            .unwrap()
            .expect("log present");
        assert_eq!(stored, log);
    }

    #[test]
    fn daily_and_tactical_logs_coexist_for_same_date() {
        let conn = test_conn();
        let daily = TrainingLog::new("kim", day("2024-06-03"), LogType::Daily);
        let mut tactical = TrainingLog::new("kim", day("2024-06-03"), LogType::Tactical);
        tactical.tactical_image = "data:image/png;base64,AAAA".to_string();

        upsert_log(&conn, &daily).unwrap();
        upsert_log(&conn, &tactical).unwrap();

        assert_eq!(count_rows(&conn), 2);
        let t = get_log(&conn, "kim", "2024-06-03", LogType::Tactical)
            .unwrap()
            .unwrap();
        assert_eq!(t.tactical_image, "data:image/png;base64,AAAA");
    }

    #[test]
    fn get_log_missing_is_none() {
        let conn = test_conn();
        assert!(get_log(&conn, "kim", "2024-06-03", LogType::Daily)
            .unwrap()
            .is_none());
    }

    #[test]
    fn list_logs_filters_by_user_and_orders_by_date() {
        let conn = test_conn();
        for (user, date) in [("lee", "2024-06-05"), ("kim", "2024-06-04"), ("kim", "2024-06-01")] {
            upsert_log(&conn, &TrainingLog::new(user, day(date), LogType::Daily)).unwrap();
        }

        let kim = list_logs(&conn, Some("kim")).unwrap();
        assert_eq!(kim.len(), 2);
        assert!(kim.iter().all(|l| l.username == "kim"));
        assert_eq!(kim[0].date, day("2024-06-01"));

        assert_eq!(list_logs(&conn, None).unwrap().len(), 3);
        assert!(list_logs(&conn, Some("park")).unwrap().is_empty());
    }

    #[test]
    fn empty_store_lists_nothing() {
        let conn = test_conn();
        assert!(list_logs(&conn, None).unwrap().is_empty());
        assert!(list_users(&conn).unwrap().is_empty());
    }

    #[test]
    fn missing_schema_is_unavailable_not_empty() {
        let conn = Connection::open_in_memory().unwrap();
        match list_logs(&conn, None) {
            Err(TrainlogError::Unavailable(_)) => {}
            other => panic!("expected Unavailable, got {:?}", other),
        }
        assert!(matches!(
            get_user(&conn, "kim"),
            Err(TrainlogError::Unavailable(_))
        ));
    }

    #[test]
    fn every_store_call_reports_missing_schema_as_unavailable() {
        let conn = Connection::open_in_memory().unwrap();
        let log = TrainingLog::new("kim", day("2024-06-03"), LogType::Daily);

        assert!(matches!(list_users(&conn), Err(TrainlogError::Unavailable(_))));
        assert!(matches!(delete_user(&conn, "kim"), Err(TrainlogError::Unavailable(_))));
        assert!(matches!(add_user(&conn, "kim", "pw"), Err(TrainlogError::Unavailable(_))));
        assert!(matches!(upsert_log(&conn, &log), Err(TrainlogError::Unavailable(_))));
        assert!(matches!(
            list_logs(&conn, Some("kim")),
            Err(TrainlogError::Unavailable(_))
        ));
    }

    #[test]
    fn non_numeric_metrics_read_back_as_zero() {
        let conn = test_conn();
        conn.execute(
            "INSERT INTO training_logs (username, date, duration, p_swing, p_live, p_defense, log_type)
             VALUES ('kim', '2024-06-03', NULL, 'lots', ' 25 ', 12.7, 'daily')",
            [],
        )
        .unwrap();

        let log = get_log(&conn, "kim", "2024-06-03", LogType::Daily)
            .unwrap()
            .unwrap();
        assert_eq!(log.metric(Metric::Duration), 0);
        assert_eq!(log.metric(Metric::Swing), 0);
        assert_eq!(log.metric(Metric::Live), 25);
        assert_eq!(log.metric(Metric::Defense), 12);
        assert_eq!(log.location, Location::Outdoor);
    }

    #[test]
    fn unreadable_dates_are_skipped_in_listing() {
        let conn = test_conn();
        conn.execute(
            "INSERT INTO training_logs (username, date, log_type) VALUES ('kim', 'June 3rd', 'daily')",
            [],
        )
        .unwrap();
        upsert_log(&conn, &TrainingLog::new("kim", day("2024-06-04"), LogType::Daily)).unwrap();

        let logs = list_logs(&conn, Some("kim")).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].date, day("2024-06-04"));
    }

    #[test]
    fn coerce_metric_handles_every_value_kind() {
        assert_eq!(coerce_metric(Value::Integer(7)), 7);
        assert_eq!(coerce_metric(Value::Real(3.9)), 3);
        assert_eq!(coerce_metric(Value::Text("40".into())), 40);
        assert_eq!(coerce_metric(Value::Text("2.5".into())), 2);
        assert_eq!(coerce_metric(Value::Text("n/a".into())), 0);
        assert_eq!(coerce_metric(Value::Null), 0);
        assert_eq!(coerce_metric(Value::Blob(vec![1, 2])), 0);
    }

    #[test]
    fn user_lookup_is_exact() {
        let conn = test_conn();
        add_user(&conn, "Kim", "pw1").unwrap();

        assert_eq!(get_user(&conn, "Kim").unwrap().unwrap().password, "pw1");
        assert!(get_user(&conn, "kim").unwrap().is_none());
        assert!(get_user(&conn, " Kim").unwrap().is_none());
    }

    #[test]
    fn add_user_rejects_duplicates_and_empty_names() {
        let conn = test_conn();
        add_user(&conn, "kim", "pw").unwrap();
        assert!(matches!(
            add_user(&conn, "kim", "other"),
            Err(TrainlogError::UserExists(name)) if name == "kim"
        ));
        assert!(matches!(
            add_user(&conn, "", "pw"),
            Err(TrainlogError::InvalidInput(_))
        ));
    }

    #[test]
    fn delete_user_reports_whether_a_row_was_removed() {
        let conn = test_conn();
        add_user(&conn, "kim", "pw").unwrap();
        add_user(&conn, "lee", "pw").unwrap();

        assert!(delete_user(&conn, "kim").unwrap());
        assert!(!delete_user(&conn, "kim").unwrap());

        let users = list_users(&conn).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "lee");
    }

    #[test]
    fn open_connection_refuses_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.db");
        assert!(matches!(
            open_connection(&path),
            Err(TrainlogError::Unavailable(_))
        ));

        initialize_db(&path).unwrap();
        let conn = open_connection(&path).unwrap();
        assert!(list_logs(&conn, None).unwrap().is_empty());
    }
}
