//
//  rested-api
//  cli/call.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Direct API call command
//!
//! Makes one authenticated request against the configured base URL. The
//! token is refreshed first when it is missing or about to expire.
//!
//! ## Examples
//!
//! ```bash
//! # List widgets
//! rested call GET /widgets -q page=2
//!
//! # Create a widget
//! rested call POST /widgets -d '{"name": "gear"}'
//!
//! # Body from a file, one field of the response
//! rested call PUT /widgets/7 -d @widget.json --select .data.id
//! ```

use anyhow::{anyhow, Result};
use clap::Args;

use crate::api::{ApiResponse, HttpMethod};
use crate::output::{select_path, OutputWriter};

use super::{parse_pairs, parse_payload, GlobalOptions};

/// Make an authenticated request
#[derive(Args, Debug)]
pub struct CallCommand {
    /// HTTP method (GET, POST, PUT, DELETE)
    pub method: String,

    /// Path appended to the base URL (e.g., /widgets/7)
    pub path: String,

    /// Query parameters as key=value (can be specified multiple times)
    #[arg(long, short = 'q', action = clap::ArgAction::Append)]
    pub query: Vec<String>,

    /// Request headers as Name:Value (can be specified multiple times)
    #[arg(long, short = 'H', action = clap::ArgAction::Append)]
    pub header: Vec<String>,

    /// JSON request body, @file to read a file, or @- for stdin
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Print only the value at a dotted path of the response (e.g., .data.id)
    #[arg(long)]
    pub select: Option<String>,
}

impl CallCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let method: HttpMethod = self.method.parse()?;
        let query = parse_pairs(&self.query, '=')?;
        let headers = parse_pairs(&self.header, ':')?;
        let payload = parse_payload(self.data.as_deref())?;

        let (_, api) = global.build_api().await?;
        let response = api.request(method, &self.path, &query, &headers, payload).await?;

        write_response(&OutputWriter::from_flag(global.json), &response, self.select.as_deref())
    }
}

/// Writes a call outcome, optionally narrowed to one field.
pub(crate) fn write_response(
    writer: &OutputWriter,
    response: &ApiResponse,
    select: Option<&str>,
) -> Result<()> {
    let Some(path) = select else {
        return writer.write(response);
    };

    let body = response
        .json()
        .ok_or_else(|| anyhow!("--select needs a JSON response; parsing is disabled or the body is empty"))?;
    writer.write(select_path(body, path)?)
}
