// src/commands.rs

use crate::cli::{AuthArgs, LogArgs, UserCommands};
use crate::config::Config;
use crate::dashboard;
use crate::db::{self, Upsert};
use crate::error::{Result, TrainlogError};
use crate::export;
use crate::models::{LogType, Metric, TextField, TrainingLog};
use crate::session::Session;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// 处理 'init' 命令
pub fn handle_init(config: &Config) -> Result<()> {
    db::initialize_db(&config.db_path)?;
    println!("✓ Database initialized at: {}", config.db_path.display());
    Ok(())
}

/// 根据命令行参数建立会话：提供 PIN 时为管理员，否则按用户名和密码登录
pub fn authenticate(
    conn: &Connection,
    auth: &AuthArgs,
    config: &Config,
    date: NaiveDate,
) -> Result<Session> {
    if let Some(pin) = &auth.pin {
        return Session::admin(pin, &config.admin_pin, date);
    }
    match (&auth.user, &auth.password) {
        (Some(user), Some(password)) => Session::login(conn, user, password, date),
        _ => Err(TrainlogError::InvalidInput(
            "Log in with --user and --password, or --pin for admin.".to_string(),
        )),
    }
}

/// 单项训练数量的上限（次数或分钟）
pub const MAX_COUNT: i64 = 100_000;

/// 把命令行参数覆盖到日志上；未提供的参数保持原值
pub fn apply_log_args(log: &mut TrainingLog, args: LogArgs) -> Result<()> {
    let counts = [
        ("duration", args.duration),
        ("swing", args.swing),
        ("live", args.live),
        ("defense", args.defense),
        ("pitching", args.pitching),
        ("running", args.running),
        ("hanging", args.hanging),
    ];
    for (name, value) in counts {
        if let Some(v) = value {
            if !(0..=MAX_COUNT).contains(&v) {
                return Err(TrainlogError::InvalidInput(format!(
                    "{} must be between 0 and {}: {}",
                    name, MAX_COUNT, v
                )));
            }
        }
    }

    if let Some(v) = args.duration {
        log.duration = v;
    }
    if let Some(v) = args.location {
        log.location = v;
    }
    if let Some(v) = args.intensity {
        log.intensity = v;
    }
    if let Some(v) = args.satisfaction {
        log.satisfaction = v;
    }
    if let Some(v) = args.swing {
        log.p_swing = v;
    }
    if let Some(v) = args.live {
        log.p_live = v;
    }
    if let Some(v) = args.defense {
        log.p_defense = v;
    }
    if let Some(v) = args.pitching {
        log.p_pitching = v;
    }
    if let Some(v) = args.running {
        log.p_running = v;
    }
    if let Some(v) = args.hanging {
        log.p_hanging = v;
    }

    let texts = [
        (TextField::GudanContent, args.team),
        (TextField::Etc, args.etc),
        (TextField::CoachFeedback, args.coach),
        (TextField::SelfGood, args.good),
        (TextField::SelfBad, args.bad),
        (TextField::Promise, args.promise),
        (TextField::Memo, args.memo),
    ];
    for (field, value) in texts {
        if let Some(v) = value {
            log.set_text(field, v);
        }
    }
    if let Some(v) = args.image {
        log.tactical_image = v;
    }
    Ok(())
}

/// 取会话日期已保存的日志，没有则用表单默认值新建
fn load_or_new(conn: &Connection, session: &Session, log_type: LogType) -> Result<TrainingLog> {
    let date = session.current_date.format(crate::models::DATE_FORMAT).to_string();
    Ok(db::get_log(conn, &session.username, &date, log_type)?
        .unwrap_or_else(|| TrainingLog::new(&session.username, session.current_date, log_type)))
}

/// 处理 'log' 命令
pub fn handle_log(conn: &Connection, session: &Session, args: LogArgs) -> Result<()> {
    session.require_player("log")?;
    let log_type = args.kind.unwrap_or_default();
    let mut log = load_or_new(conn, session, log_type)?;
    apply_log_args(&mut log, args)?;

    match db::upsert_log(conn, &log)? {
        Upsert::Inserted => println!("✓ Log for {} saved.", log.date_str()),
        Upsert::Updated => println!("✓ Log for {} updated.", log.date_str()),
    }
    Ok(())
}

/// 处理 'note' 命令：在编辑器中修改一个文本字段
pub fn handle_note(conn: &Connection, session: &Session, field: TextField) -> Result<()> {
    session.require_player("note")?;
    let mut log = load_or_new(conn, session, LogType::Daily)?;
    let old_content = log.text(field).to_string();

    let mut temp_file = tempfile::NamedTempFile::new()?;
    temp_file.write_all(old_content.as_bytes())?;
    temp_file.flush()?;

    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    debug!(editor = %editor, field = ?field, "Opening editor");
    let status = Command::new(&editor).arg(temp_file.path()).status()?;

    if !status.success() {
        return Err(TrainlogError::EditorError);
    }

    let new_content = std::fs::read_to_string(temp_file.path())?;
    if new_content.trim() == old_content.trim() {
        return Err(TrainlogError::NoChangesMade);
    }

    log.set_text(field, new_content.trim_end().to_string());
    db::upsert_log(conn, &log)?;
    println!("✓ Log for {} updated.", log.date_str());
    Ok(())
}

pub fn format_log(log: &TrainingLog) -> String {
    let mut lines = vec![
        format!("Training Journal: {} ({}, {})", log.date_str(), log.username, log.log_type),
        format!("Time: {} min | Location: {}", log.duration, log.location.label()),
        format!(
            "Intensity: {} | Satisfaction: {}",
            log.intensity.as_str(),
            log.satisfaction.as_str()
        ),
    ];
    for metric in Metric::ALL.iter().skip(1) {
        lines.push(format!(
            "  {}: {} {}",
            metric.label(),
            log.metric(*metric),
            metric.unit()
        ));
    }
    let texts = [
        ("Team training", &log.gudan_content),
        ("Other", &log.p_etc),
        ("Coach feedback", &log.coach_feedback),
        ("Good", &log.self_good),
        ("Bad", &log.self_bad),
        ("Promise", &log.promise),
        ("Memo", &log.memo),
    ];
    for (title, text) in texts {
        if !text.trim().is_empty() {
            lines.push(format!("{}:\n  {}", title, text.trim_end().replace('\n', "\n  ")));
        }
    }
    lines.join("\n")
}

/// 处理 'show' 命令
pub fn handle_show(conn: &Connection, session: &Session) -> Result<()> {
    session.require_player("show")?;
    let date = session.current_date.format(crate::models::DATE_FORMAT).to_string();
    let log = db::get_log(conn, &session.username, &date, LogType::Daily)?.ok_or_else(|| {
        TrainlogError::LogNotFound {
            username: session.username.clone(),
            date: date.clone(),
            log_type: LogType::Daily.to_string(),
        }
    })?;
    println!("{}", format_log(&log));
    Ok(())
}

/// 会话可读取的日志范围：球员只能看自己的，管理员可看任何人（None 表示全队）
pub fn scope_for(session: &Session, player: Option<String>) -> Result<Option<String>> {
    if session.is_admin {
        return Ok(player);
    }
    match player {
        Some(p) if p != session.username => Err(TrainlogError::PermissionDenied(format!(
            "{} cannot read {}'s logs",
            session.username, p
        ))),
        _ => Ok(Some(session.username.clone())),
    }
}

/// 处理 'dash' 命令
pub fn handle_dash(
    conn: &Connection,
    session: &Session,
    metric: Metric,
    json: bool,
    player: Option<String>,
) -> Result<()> {
    let scope = scope_for(session, player)?;
    let logs = db::list_logs(conn, scope.as_deref())?;
    debug!(rows = logs.len(), metric = metric.column(), "Building dashboard");
    let dash = dashboard::aggregate(&logs, session.current_date, metric);

    if json {
        println!("{}", serde_json::to_string_pretty(&dash)?);
    } else {
        if let Some(name) = &scope {
            println!("Player: {}", name);
        }
        print!("{}", dashboard::render(&dash));
    }
    Ok(())
}

/// 处理 'list' 命令
pub fn handle_list(conn: &Connection, session: &Session, player: Option<String>) -> Result<()> {
    let scope = scope_for(session, player)?;
    let logs = db::list_logs(conn, scope.as_deref())?;
    if logs.is_empty() {
        println!("No logs found.");
        return Ok(());
    }
    for log in &logs {
        println!(
            "{} {:<12} {:<8} {:>4} min | swing {} | pitching {}",
            log.date_str(),
            log.username,
            log.log_type,
            log.duration,
            log.p_swing,
            log.p_pitching
        );
    }
    println!("{}", "─".repeat(40));
    println!("{} log(s)", logs.len());
    Ok(())
}

/// 处理 'export' 命令：管理员导出全部日志，球员只导出自己的
pub fn handle_export(conn: &Connection, session: &Session, path: &str) -> Result<usize> {
    let scope = scope_for(session, None)?;
    let logs = db::list_logs(conn, scope.as_deref())?;
    let rows = export::write_xlsx(&logs, Path::new(path))?;
    println!("✓ Exported {} log(s) to {}", rows, path);
    Ok(rows)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} (y/N): ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// 处理 'user' 子命令
pub fn handle_user(conn: &Connection, session: &Session, cmd: UserCommands) -> Result<()> {
    session.require_admin("user")?;
    match cmd {
        UserCommands::Add { name, password } => {
            db::add_user(conn, &name, &password)?;
            println!("✓ Player '{}' registered.", name);
        }
        UserCommands::Del { name, yes } => {
            if db::get_user(conn, &name)?.is_none() {
                return Err(TrainlogError::UserNotFound(name));
            }
            if !yes && !confirm(&format!("Delete player '{}'?", name))? {
                println!("Cancelled.");
                return Ok(());
            }
            if db::delete_user(conn, &name)? {
                info!(username = %name, "Player removed");
                println!("✓ Player '{}' deleted.", name);
            } else {
                return Err(TrainlogError::UserNotFound(name));
            }
        }
        UserCommands::List => {
            let users = db::list_users(conn)?;
            if users.is_empty() {
                println!("No players registered.");
            }
            for user in users {
                println!("- {}", user.username);
            }
        }
    }
    Ok(())
}
