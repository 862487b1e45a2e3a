//
//  rested-api
//  cli/route.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Route commands
//!
//! Routes come from the `[routes.<name>]` sections of the config file. Each
//! allowed verb is callable by its exposed name, such as `getWidgets`.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::output::OutputWriter;
use crate::registry::{Route, RouteCall};

use super::call::write_response;
use super::{parse_pairs, parse_payload, GlobalOptions};

/// List and call configured routes
#[derive(Args, Debug)]
pub struct RouteCommand {
    #[command(subcommand)]
    pub command: RouteSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum RouteSubcommand {
    /// List configured routes and their exposed methods
    #[command(visible_alias = "ls")]
    List,

    /// Call a route method by exposed name (e.g., postWidgets)
    Call(RouteCallArgs),
}

#[derive(Args, Debug)]
pub struct RouteCallArgs {
    /// Exposed method name, verb prefix plus route name
    pub exposed: String,

    /// Sub-path appended to the route path (e.g., 7 for /widgets/7)
    pub sub_path: Option<String>,

    /// Query parameters as key=value, over the route defaults
    #[arg(long, short = 'q', action = clap::ArgAction::Append)]
    pub query: Vec<String>,

    /// Request headers as Name:Value, over the route defaults
    #[arg(long, short = 'H', action = clap::ArgAction::Append)]
    pub header: Vec<String>,

    /// JSON request body, @file to read a file, or @- for stdin
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Print only the value at a dotted path of the response
    #[arg(long)]
    pub select: Option<String>,
}

impl RouteCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            RouteSubcommand::List => self.list(global).await,
            RouteSubcommand::Call(args) => self.call(args, global).await,
        }
    }

    async fn list(&self, global: &GlobalOptions) -> Result<()> {
        let (_, api) = global.build_api().await?;
        let routes: Vec<Route> = api.routes().all().values().cloned().collect();

        OutputWriter::from_flag(global.json).write(routes.as_slice())
    }

    async fn call(&self, args: &RouteCallArgs, global: &GlobalOptions) -> Result<()> {
        let mut call = RouteCall::new().query(parse_pairs(&args.query, '=')?);
        for (name, value) in parse_pairs(&args.header, ':')? {
            if let Some(value) = value.as_str() {
                call = call.header(name, value);
            }
        }
        if let Some(sub_path) = &args.sub_path {
            call = call.path(sub_path.clone());
        }
        if let Some(payload) = parse_payload(args.data.as_deref())? {
            call = call.payload(payload);
        }

        let (_, api) = global.build_api().await?;
        let response = api.invoke(&args.exposed, call).await?;

        write_response(&OutputWriter::from_flag(global.json), &response, args.select.as_deref())
    }
}
