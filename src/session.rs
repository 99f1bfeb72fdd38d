// src/session.rs

use crate::db;
use crate::error::{Result, TrainlogError};
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::{info, warn};

pub const ADMIN_USERNAME: &str = "admin";

/// Who is acting and on which day. Built once per invocation and handed to
/// every command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub is_admin: bool,
    pub current_date: NaiveDate,
}

impl Session {
    /// Player login. Username and password are compared exactly as typed.
    pub fn login(
        conn: &Connection,
        username: &str,
        password: &str,
        current_date: NaiveDate,
    ) -> Result<Self> {
        let user = db::get_user(conn, username)?;
        match user {
            Some(u) if u.password == password => {
                info!(username = %username, "Login succeeded");
                Ok(Self {
                    username: u.username,
                    is_admin: false,
                    current_date,
                })
            }
            _ => {
                warn!(username = %username, "Login failed");
                Err(TrainlogError::AuthenticationFailed)
            }
        }
    }

    /// Admin access through the configured PIN; no user row is involved.
    pub fn admin(pin: &str, expected_pin: &str, current_date: NaiveDate) -> Result<Self> {
        if expected_pin.is_empty() || pin != expected_pin {
            warn!("Admin PIN rejected");
            return Err(TrainlogError::AuthenticationFailed);
        }
        info!("Admin session opened");
        Ok(Self {
            username: ADMIN_USERNAME.to_string(),
            is_admin: true,
            current_date,
        })
    }

    pub fn require_admin(&self, action: &str) -> Result<()> {
        if self.is_admin {
            Ok(())
        } else {
            warn!(username = %self.username, action = %action, "Permission denied");
            Err(TrainlogError::PermissionDenied(format!(
                "'{}' requires the admin PIN",
                action
            )))
        }
    }

    /// Player-only actions (writing one's own journal). The admin session has no journal.
    pub fn require_player(&self, action: &str) -> Result<()> {
        if self.is_admin {
            Err(TrainlogError::PermissionDenied(format!(
                "'{}' needs a player login, not the admin PIN",
                action
            )))
        } else {
            Ok(())
        }
    }
}
