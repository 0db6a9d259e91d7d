//! `mail list`, `mail get` and `mail send`.

use std::io::{self, Write};

use anyhow::{Context as _, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use go365_core::dateparse;
use go365_graph::mail::{ItemBody, Recipient, parse_recipients};
use go365_graph::{ListMessagesOptions, ListResponse, Message};

use super::{Session, now};
use crate::cli::{MailListArgs, MailSendArgs, OutputArgs};
use crate::output::{self, ActionResponse};

pub async fn list(session: &Session, args: MailListArgs) -> Result<()> {
    let options = ListMessagesOptions {
        folder_id: args.folder_id,
        top: args.page.top,
        skip: args.skip,
        page_token: args.page.page_token,
        filter: args.filter,
        order_by: args.order_by,
        start_time: args.since.as_deref().map(past_time).transpose()?,
        end_time: args.until.as_deref().map(past_time).transpose()?,
    };

    let client = session.graph().await?;
    let page = client
        .list_messages(&options)
        .await
        .context("failed to list messages")?;

    if args.output.json {
        output::print_json(&page)?;
    } else {
        render_list(&mut io::stdout().lock(), &page)?;
    }
    Ok(())
}

/// `--since` / `--until` read bare weekdays as the previous one.
fn past_time(input: &str) -> Result<DateTime<Utc>> {
    let t = dateparse::parse_with_past(input, now())
        .with_context(|| format!("invalid date {input:?}"))?;
    Ok(t.with_timezone(&Utc))
}

fn render_list<W: Write>(out: &mut W, page: &ListResponse<Message>) -> io::Result<()> {
    if page.items().is_empty() {
        return writeln!(out, "No messages found");
    }
    for msg in page.items() {
        writeln!(out, "ID: {}", msg.id.as_deref().unwrap_or_default())?;
        writeln!(out, "Subject: {}", msg.subject.as_deref().unwrap_or_default())?;
        if let Some(from) = &msg.from {
            writeln!(out, "From: {}", from.display())?;
        }
        if let Some(received) = msg.received_date_time {
            writeln!(
                out,
                "Received: {}",
                received.to_rfc3339_opts(SecondsFormat::Secs, true)
            )?;
        }
        writeln!(out, "---")?;
    }
    output::next_page_hint(out, page.next_token())
}

pub async fn get(session: &Session, id: &str, opts: OutputArgs) -> Result<()> {
    let client = session.graph().await?;
    let mut msg = client
        .get_message(id)
        .await
        .context("failed to get message")?;

    if opts.markdown {
        output::markdown_body(msg.body.as_mut());
    }
    if opts.json {
        output::print_json(&msg)?;
    } else {
        render_message(&mut io::stdout().lock(), &msg)?;
    }
    Ok(())
}

fn render_message<W: Write>(out: &mut W, msg: &Message) -> io::Result<()> {
    writeln!(out, "ID: {}", msg.id.as_deref().unwrap_or_default())?;
    writeln!(out, "Subject: {}", msg.subject.as_deref().unwrap_or_default())?;
    if let Some(from) = &msg.from {
        writeln!(out, "From: {}", from.display())?;
    }
    if !msg.to_recipients.is_empty() {
        writeln!(out, "To: {}", join_recipients(&msg.to_recipients))?;
    }
    if !msg.cc_recipients.is_empty() {
        writeln!(out, "Cc: {}", join_recipients(&msg.cc_recipients))?;
    }
    if let Some(received) = msg.received_date_time {
        writeln!(
            out,
            "Received: {}",
            received.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
    }
    if let Some(body) = &msg.body {
        writeln!(
            out,
            "\nBody ({}):\n{}",
            body.content_type.as_deref().unwrap_or("Text"),
            body.content.as_deref().unwrap_or_default()
        )?;
    }
    Ok(())
}

fn join_recipients(recipients: &[Recipient]) -> String {
    recipients
        .iter()
        .map(Recipient::display)
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn send(session: &Session, args: MailSendArgs) -> Result<()> {
    let message = compose(&args);
    let client = session.graph().await?;
    client
        .send_mail(&message, args.save_to_sent_items)
        .await
        .context("failed to send message")?;

    if args.output.json {
        output::print_json(&ActionResponse::ok("Message sent successfully"))?;
    } else {
        println!("Message sent successfully!");
    }
    Ok(())
}

fn compose(args: &MailSendArgs) -> Message {
    Message {
        subject: Some(args.subject.clone()),
        body: Some(ItemBody::new(args.body_type.as_str(), args.body.as_str())),
        to_recipients: parse_recipients(&args.to),
        cc_recipients: args.cc.as_deref().map(parse_recipients).unwrap_or_default(),
        bcc_recipients: args.bcc.as_deref().map(parse_recipients).unwrap_or_default(),
        ..Message::default()
    }
}
