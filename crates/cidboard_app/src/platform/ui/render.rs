use std::fmt::Write;

use chrono::Local;
use cidboard_core::{
    AppViewModel, AuthView, DashboardView, PasswordView, Route, StatusPanelView, StatusSnapshot,
};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

pub fn render(view: &AppViewModel) -> String {
    match view.route {
        Route::Login => render_auth(&view.auth),
        Route::Dashboard => render_dashboard(&view.dashboard),
    }
}

fn render_auth(view: &AuthView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", view.title);
    if let Some(full_name) = &view.full_name {
        line(&mut out, "Full name", full_name, view.errors.full_name.as_deref());
    }
    line(&mut out, "Email", &view.email, view.errors.email.as_deref());
    if view.full_name.is_some() {
        line(&mut out, "Role", &view.role, None);
    }
    line(
        &mut out,
        "Password",
        &password(&view.password),
        view.errors.password.as_deref(),
    );
    if let Some(confirm) = &view.confirm_password {
        line(
            &mut out,
            "Confirm",
            &password(confirm),
            view.errors.confirm_password.as_deref(),
        );
    }
    let _ = writeln!(out, "{}", button(view.submit_label, view.submit_enabled));
    let _ = writeln!(out, "{} `switch` to {}", view.switch_prompt, view.switch_label);
    if let Some(message) = &view.message {
        let _ = writeln!(out, "> {message}");
    }
    out
}

fn render_dashboard(view: &DashboardView) -> String {
    let controls = view.controls;
    let mut out = String::new();
    let _ = writeln!(out, "=== CID Dashboard ===");

    let _ = writeln!(out, "-- Upload Excel File --");
    line(
        &mut out,
        "File",
        view.selected_file.as_deref().unwrap_or("(none)"),
        None,
    );
    line(&mut out, "Tag", &view.tag_input, None);
    line(&mut out, "Collection", &view.collection_input, None);
    let upload_label = if controls.upload_enabled {
        "Upload"
    } else {
        "Uploading..."
    };
    let _ = writeln!(out, "{}", button(upload_label, controls.upload_enabled));

    let _ = writeln!(out, "-- Processing --");
    line(&mut out, "Workers", &view.workers.to_string(), None);
    line(&mut out, "Collection", &view.processing_collection, None);
    let start_label = if controls.start_enabled {
        "Start"
    } else {
        "Starting..."
    };
    let _ = writeln!(
        out,
        "{} {} {} {} [Retry failed]",
        button(start_label, controls.start_enabled),
        button("Pause", controls.pause_enabled),
        button("Resume", controls.resume_enabled),
        button("Stop", controls.stop_enabled),
    );

    let _ = writeln!(out, "-- Status -- {}", button("Refresh", controls.refresh_enabled));
    match &view.status {
        StatusPanelView::Error(error) => {
            let _ = writeln!(out, "Error: {error}");
        }
        StatusPanelView::Snapshot(snapshot) => {
            let _ = writeln!(out, "{}", status_table(snapshot));
        }
    }

    let _ = writeln!(out, "-- Collections --");
    if view.collections.is_empty() {
        let _ = writeln!(out, "(no collections)");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Collection", "Current"]);
        for row in &view.collections {
            table.add_row(vec![
                Cell::new(&row.name),
                Cell::new(if row.is_current { "*" } else { "" }),
            ]);
        }
        let _ = writeln!(out, "{table}");
    }

    let _ = writeln!(out, "-- Download --");
    line(&mut out, "Collection", &view.download_collection, None);
    line(
        &mut out,
        "Tag",
        &format!("{} of [{}]", view.download_tag, view.tag_options.join(", ")),
        None,
    );
    let _ = writeln!(out, "{}", button("Download", controls.download_enabled));

    if !view.responses.is_empty() {
        let _ = writeln!(out, "-- Responses --");
        for entry in &view.responses {
            let marker = if entry.is_error { "ERR" } else { "OK " };
            let _ = writeln!(
                out,
                "{} [{}] {}",
                marker,
                entry.timestamp.with_timezone(&Local).format("%H:%M:%S"),
                entry.message
            );
        }
    }
    out
}

fn status_table(snapshot: &StatusSnapshot) -> Table {
    let state = if !snapshot.processing_active {
        if snapshot.stopped {
            "Stopped"
        } else {
            "Idle"
        }
    } else if snapshot.paused {
        "Paused"
    } else {
        "Running"
    };
    let max_workers = snapshot
        .max_workers
        .map(|max| format!("{} / {max}", snapshot.active_workers))
        .unwrap_or_else(|| snapshot.active_workers.to_string());
    let tags = if snapshot.tags.is_empty() {
        "(none)".to_string()
    } else {
        snapshot.tags.join(", ")
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);
    let rows: Vec<(&str, String)> = vec![
        ("State", state.to_string()),
        ("Active workers", max_workers),
        ("Current collection", snapshot.current_collection.clone()),
        ("Total", snapshot.total.to_string()),
        ("New", snapshot.new.to_string()),
        ("Processing", snapshot.processing.to_string()),
        ("Processed", snapshot.processed.to_string()),
        ("Failed", snapshot.failed.to_string()),
        ("Failed (current)", snapshot.current_failed_count.to_string()),
        ("Last processed", snapshot.last_processed.to_string()),
        ("Processed this run", snapshot.total_processed.to_string()),
        ("Failed this run", snapshot.total_failed.to_string()),
        ("Tags", tags),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    table
}

fn line(out: &mut String, label: &str, value: &str, error: Option<&str>) {
    let _ = writeln!(out, "{label:>12}: {value}");
    if let Some(error) = error {
        let _ = writeln!(out, "{:>12}  ! {error}", "");
    }
}

fn password(view: &PasswordView) -> String {
    let hint = if view.masked { "hidden" } else { "shown" };
    format!("{} ({hint})", view.display)
}

fn button(label: &str, enabled: bool) -> String {
    if enabled {
        format!("[{label}]")
    } else {
        format!("[{label}: off]")
    }
}
