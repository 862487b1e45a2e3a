//
//  rested-api
//  cli/token.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Token commands

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::auth::Token;
use crate::output::{format_bool, print_field, print_header, OutputWriter, TableOutput};

use super::GlobalOptions;

/// Inspect or refresh the bearer token
#[derive(Args, Debug)]
pub struct TokenCommand {
    #[command(subcommand)]
    pub command: TokenSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TokenSubcommand {
    /// Show the bootstrapped token's expiry and validity
    Show(TokenArgs),

    /// Fetch a new token from the token endpoint
    Refresh(TokenArgs),
}

#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Include the raw token value in the output
    #[arg(long)]
    pub reveal: bool,
}

/// What is known about a token, without its value unless revealed.
#[derive(Debug, Serialize)]
pub struct TokenStatus {
    pub present: bool,
    pub valid: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub token_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl TokenStatus {
    fn new(token: Option<&Token>, token_url: &str, reveal: bool) -> Self {
        Self {
            present: token.is_some(),
            valid: token.is_some_and(|t| !t.is_expired()),
            expires_at: token.and_then(|t| t.expires_at()),
            token_url: token_url.to_string(),
            token: token.filter(|_| reveal).map(|t| t.value().to_string()),
        }
    }
}

impl TableOutput for TokenStatus {
    fn print_table(&self, color: bool) {
        print_header("Bearer Token");
        print_field("Present", &format_bool(self.present, color), color);
        print_field("Valid", &format_bool(self.valid, color), color);
        let expiry = self
            .expires_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        print_field("Expires", &expiry, color);
        print_field("Endpoint", &self.token_url, color);
        if let Some(token) = &self.token {
            print_field("Token", token, color);
        }
    }
}

impl TokenCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            TokenSubcommand::Show(args) => self.show(args, global).await,
            TokenSubcommand::Refresh(args) => self.refresh(args, global).await,
        }
    }

    async fn show(&self, args: &TokenArgs, global: &GlobalOptions) -> Result<()> {
        let (_, api) = global.build_api().await?;
        let tokens = api.client().tokens();
        let current = tokens.current().await;

        let status = TokenStatus::new(current.as_ref(), tokens.token_url(), args.reveal);
        OutputWriter::from_flag(global.json).write(&status)
    }

    async fn refresh(&self, args: &TokenArgs, global: &GlobalOptions) -> Result<()> {
        let (_, api) = global.build_api().await?;
        let tokens = api.client().tokens();
        tokens.refresh().await?;
        let current = tokens.current().await;

        let writer = OutputWriter::from_flag(global.json);
        if !global.json {
            writer.write_success("Token refreshed");
        }
        writer.write(&TokenStatus::new(current.as_ref(), tokens.token_url(), args.reveal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_hides_value_unless_revealed() {
        let token = Token::new("not.a.jwt");

        let hidden = TokenStatus::new(Some(&token), "http://h/auth/token", false);
        assert!(hidden.present);
        assert!(!hidden.valid);
        assert!(hidden.token.is_none());

        let shown = TokenStatus::new(Some(&token), "http://h/auth/token", true);
        assert_eq!(shown.token.as_deref(), Some("not.a.jwt"));

        let absent = TokenStatus::new(None, "/auth/token", true);
        assert!(!absent.present);
        assert!(absent.token.is_none());
    }
}
