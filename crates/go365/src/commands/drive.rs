//! `drive info` and `drive ls`.

use std::io::{self, Write};

use anyhow::{Context as _, Result};
use chrono::SecondsFormat;
use go365_graph::drive::{Drive, DriveItem};
use go365_graph::{DriveLocation, ListItemsOptions, ListResponse};

use super::Session;
use crate::cli::{DriveCommand, DriveLsArgs, LocationArgs, OutputArgs};
use crate::output;

pub async fn run(session: &Session, command: DriveCommand) -> Result<()> {
    match command {
        DriveCommand::Info { location, output } => info(session, location, output).await,
        DriveCommand::Ls(args) => ls(session, args).await,
    }
}

async fn info(session: &Session, location: LocationArgs, opts: OutputArgs) -> Result<()> {
    let client = session.graph().await?;
    let drive = client
        .get_drive(&DriveLocation::from(location))
        .await
        .context("failed to get drive")?;

    if opts.json {
        output::print_json(&drive)?;
    } else {
        render_drive(&mut io::stdout().lock(), &drive)?;
    }
    Ok(())
}

fn render_drive<W: Write>(out: &mut W, drive: &Drive) -> io::Result<()> {
    writeln!(out, "Name: {}", drive.name.as_deref().unwrap_or_default())?;
    writeln!(out, "ID: {}", drive.id.as_deref().unwrap_or_default())?;
    if let Some(kind) = &drive.drive_type {
        writeln!(out, "Type: {kind}")?;
    }
    if let Some(user) = drive.owner.as_ref().and_then(|o| o.user.as_ref()) {
        let name = user.display_name.as_deref().unwrap_or_default();
        match user.email.as_deref() {
            Some(email) => writeln!(out, "Owner: {name} <{email}>")?,
            None => writeln!(out, "Owner: {name}")?,
        }
    }
    if let Some(quota) = &drive.quota {
        writeln!(
            out,
            "Quota: {} used of {} ({} free)",
            human_size(quota.used),
            human_size(quota.total),
            human_size(quota.remaining)
        )?;
        if let Some(state) = &quota.state {
            writeln!(out, "Quota state: {state}")?;
        }
    }
    if let Some(url) = &drive.web_url {
        writeln!(out, "URL: {url}")?;
    }
    Ok(())
}

async fn ls(session: &Session, args: DriveLsArgs) -> Result<()> {
    let options = ListItemsOptions {
        location: args.location.into(),
        path: args.path,
        shared: args.shared,
        top: args.page.top,
        page_token: args.page.page_token,
        order_by: args.order_by,
    };

    let client = session.graph().await?;
    let page = client
        .list_items(&options)
        .await
        .context("failed to list drive items")?;

    if args.output.json {
        output::print_json(&page)?;
    } else {
        render_items(&mut io::stdout().lock(), &page)?;
    }
    Ok(())
}

fn render_items<W: Write>(out: &mut W, page: &ListResponse<DriveItem>) -> io::Result<()> {
    if page.items().is_empty() {
        return writeln!(out, "No items found");
    }
    for item in page.items() {
        writeln!(out, "Name: {}", item.name.as_deref().unwrap_or_default())?;
        writeln!(out, "ID: {}", item.id.as_deref().unwrap_or_default())?;
        match (&item.folder, &item.file) {
            (Some(folder), _) => writeln!(out, "Type: folder ({} items)", folder.child_count)?,
            (None, Some(file)) => match &file.mime_type {
                Some(mime) => writeln!(out, "Type: file ({mime})")?,
                None => writeln!(out, "Type: file")?,
            },
            (None, None) => {}
        }
        if !item.is_folder() {
            writeln!(out, "Size: {}", human_size(item.size))?;
        }
        if let Some(modified) = item.last_modified_date_time {
            writeln!(
                out,
                "Modified: {}",
                modified.to_rfc3339_opts(SecondsFormat::Secs, true)
            )?;
        }
        writeln!(out, "---")?;
    }
    output::next_page_hint(out, page.next_token())
}

/// Byte count in binary units with one decimal, e.g. `1.5 KB`.
#[allow(clippy::cast_precision_loss)]
fn human_size(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];
    if bytes.abs() < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value.abs() >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
