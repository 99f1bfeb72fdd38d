// src/config.rs

use crate::error::{Result, TrainlogError};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DB_PATH_VAR: &str = "TRAINLOG_DB";
pub const ADMIN_PIN_VAR: &str = "TRAINLOG_ADMIN_PIN";

const DEFAULT_ADMIN_PIN: &str = "98770491";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub admin_pin: String,
}

impl Config {
    /// 从环境变量读取配置，缺省时使用 ~/.config/trainlog/trainlog.db 和内置管理员 PIN。
    /// 调用前应已执行 load_env_file
    pub fn load() -> Result<Self> {
        let db_path = match dotenvy::var(DB_PATH_VAR) {
            Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
            _ => default_db_path()?,
        };
        let admin_pin = dotenvy::var(ADMIN_PIN_VAR).unwrap_or_else(|_| DEFAULT_ADMIN_PIN.to_string());

        debug!(db_path = %db_path.display(), "Configuration resolved");
        Ok(Self { db_path, admin_pin })
    }
}

/// 读取 .env 文件（默认为当前目录下的 .env）；已存在的环境变量不会被覆盖。
/// 必须在解析命令行之前调用，clap 的 `env =` 参数才能读到其中的登录信息
pub fn load_env_file(path: Option<&Path>) -> std::result::Result<PathBuf, dotenvy::Error> {
    match path {
        Some(p) => dotenvy::from_path(p).map(|_| p.to_path_buf()),
        None => dotenvy::dotenv(),
    }
}

/// 数据库文件的标准路径 (~/.config/trainlog/trainlog.db)
pub fn default_db_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or(TrainlogError::HomeDirNotFound)?;
    Ok(home_dir.join(".config/trainlog/trainlog.db"))
}
