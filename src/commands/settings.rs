//! `anon settings ...`

use crate::commands::Context;
use crate::error::{AppError, Result};
use crate::utils::table;

pub fn show(ctx: &Context) -> String {
    let s = &ctx.settings;
    let rows = [
        ("settings file", ctx.settings_path.display().to_string()),
        ("user name", s.user_name.clone()),
        ("user token", mask(&s.user_token)),
        ("active server", s.active_server.clone().unwrap_or_default()),
        ("servers", s.server_names().join(", ")),
        ("timeout (s)", s.client.timeout_secs.to_string()),
        ("validate https", s.client.validate_https.to_string()),
    ];
    table::key_value_table(&rows).to_string()
}

pub fn set_user(ctx: &mut Context, user_name: &str) -> Result<String> {
    let user_name = user_name.trim();
    if user_name.is_empty() {
        return Err(AppError::validation("User name cannot be empty"));
    }
    ctx.settings.user_name = user_name.to_string();
    ctx.save_settings()?;
    Ok(format!("Set user name to {user_name}"))
}

pub fn set_token(ctx: &mut Context, token: &str) -> Result<String> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::validation("Token cannot be empty"));
    }
    ctx.settings.user_token = token.to_string();
    ctx.save_settings()?;
    Ok("Set token".to_string())
}

/// Keep only the last four characters of a secret.
fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count - 4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use crate::models::Settings;

    #[test]
    fn test_set_user_and_token() {
        let (_dir, mut ctx) = testing::context();
        set_user(&mut ctx, "z123").unwrap();
        set_token(&mut ctx, "abcdef123456").unwrap();
        assert!(set_user(&mut ctx, " ").is_err());

        let saved = Settings::load(&ctx.settings_path).unwrap();
        assert_eq!(saved.user_name, "z123");
        assert_eq!(saved.user_token, "abcdef123456");

        let text = show(&ctx);
        assert!(text.contains("********3456"));
        assert!(!text.contains("abcdef"));
    }
}
