// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod daemon;

use foreman_daemon::protocol::Response;

/// Renders a daemon response to stdout. `Response::Error` never reaches
/// here in practice — `DaemonClient::send` turns it into an `Err` first —
/// but the match stays exhaustive so a new response variant doesn't
/// silently fall through unprinted.
pub fn print_response(response: &Response) {
    match response {
        Response::Ack => println!("ok"),
        Response::Status(snapshot) => print_status(snapshot),
        Response::Error { message } => eprintln!("error: {message}"),
    }
}

fn print_status(snapshot: &foreman_core::StatusSnapshot) {
    println!("work items tracked: {}", snapshot.work_item_count);
    println!("planner running:    {}", snapshot.planner_running);
    if snapshot.sessions.is_empty() {
        println!("agent sessions:     none");
        return;
    }
    println!("agent sessions:");
    for session in &snapshot.sessions {
        let target = session
            .work_item_id
            .map(|id| format!("work item #{id}"))
            .or_else(|| session.spec_paths.as_ref().map(|paths| paths.join(", ")))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  [{:>11}] {:<10} {} (session {})",
            format!("{:?}", session.status).to_lowercase(),
            session.role.as_str(),
            target,
            session.session_id,
        );
    }
}
