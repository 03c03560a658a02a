// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn required(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

fn optional(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn id_arg() -> Arg {
    required("id", "Entry id")
}

pub fn build_cli() -> Command {
    Command::new("pennywise")
        .about("Personal budgeting: totals, budgets, goals, bill reminders and alerts")
        .version(crate_version!())
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .arg(
            Arg::new("now")
                .long("now")
                .global(true)
                .help("Evaluate as of this instant (YYYY-MM-DD or RFC 3339)"),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .global(true)
                .help("Use a JSON ledger file instead of the SQLite database"),
        )
        .subcommand(Command::new("init").about("Create the ledger and print its location"))
        .subcommand(
            Command::new("tx")
                .about("Income and expense records")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Record an income or expense (amount in display currency)")
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(required("date", "YYYY-MM-DD"))
                        .arg(required("amount", "Amount in display currency"))
                        .arg(required("name", "Source or description"))
                        .arg(optional("category", "Expense category"))
                        .arg(optional("notes", "Free-form notes")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List records, newest first")
                        .arg(optional("month", "Only this YYYY-MM"))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .value_parser(["income", "expense"]),
                        ),
                ))
                .subcommand(Command::new("rm").about("Delete a record").arg(id_arg())),
        )
        .subcommand(
            Command::new("budget")
                .about("Category spending limits")
                .subcommand_required(true)
                .subcommand(
                    Command::new("set")
                        .about("Create or update a budget (limit in display currency)")
                        .arg(optional("id", "Update this budget instead of creating one"))
                        .arg(required("category", "Expense category"))
                        .arg(required("limit", "Limit in display currency"))
                        .arg(
                            Arg::new("period")
                                .long("period")
                                .default_value("Monthly")
                                .help("Monthly, Weekly, Yearly, One-time or Custom"),
                        )
                        .arg(optional("start", "Window start for one-time budgets"))
                        .arg(optional("end", "Window end for one-time budgets")),
                )
                .subcommand(json_flags(
                    Command::new("list").about("Budgets with spend in the active window"),
                ))
                .subcommand(Command::new("rm").about("Delete a budget").arg(id_arg())),
        )
        .subcommand(
            Command::new("goal")
                .about("Savings goals")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Create a goal (amounts in display currency)")
                        .arg(required("title", "Goal title"))
                        .arg(required("target", "Target amount"))
                        .arg(
                            Arg::new("saved")
                                .long("saved")
                                .default_value("0")
                                .help("Already saved"),
                        )
                        .arg(optional("deadline", "YYYY-MM-DD")),
                )
                .subcommand(json_flags(Command::new("list").about("Goals with progress")))
                .subcommand(json_flags(
                    Command::new("distribute")
                        .about("Spread a lump sum across goals, most urgent first")
                        .arg(required("amount", "Amount in display currency"))
                        .arg(optional("policy", "equal-share or skip (default from config)"))
                        .arg(
                            Arg::new("dry-run")
                                .long("dry-run")
                                .action(ArgAction::SetTrue)
                                .help("Show the allocation without saving it"),
                        ),
                ))
                .subcommand(Command::new("rm").about("Delete a goal").arg(id_arg())),
        )
        .subcommand(
            Command::new("reminder")
                .about("Bill reminders")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Create a reminder (amount in display currency)")
                        .arg(required("title", "Bill name"))
                        .arg(required("amount", "Amount due"))
                        .arg(required("due", "Due date YYYY-MM-DD"))
                        .arg(
                            Arg::new("recurring")
                                .long("recurring")
                                .default_value("Monthly")
                                .help("Monthly, Weekly, Yearly or One-time"),
                        )
                        .arg(optional("category", "Category"))
                        .arg(optional("description", "Description")),
                )
                .subcommand(json_flags(
                    Command::new("list").about("Reminders by due date with status"),
                ))
                .subcommand(Command::new("rm").about("Delete a reminder").arg(id_arg())),
        )
        .subcommand(
            Command::new("alerts")
                .about("Notifications derived from the ledger")
                .subcommand_required(true)
                .subcommand(json_flags(
                    Command::new("list").about("All notifications, newest first").arg(
                        Arg::new("unread")
                            .long("unread")
                            .action(ArgAction::SetTrue)
                            .help("Only unread"),
                    ),
                ))
                .subcommand(Command::new("read").about("Mark one notification read").arg(id_arg()))
                .subcommand(Command::new("read-all").about("Mark every current notification read"))
                .subcommand(
                    Command::new("add")
                        .about("Add a custom notification")
                        .arg(required("message", "Notification text"))
                        .arg(optional("type", "Notification type (default info)")),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Dashboard figures")
                .subcommand_required(true)
                .subcommand(json_flags(
                    Command::new("totals")
                        .about("Income, expense and savings")
                        .arg(optional("month", "Only this YYYY-MM")),
                ))
                .subcommand(json_flags(
                    Command::new("by-category")
                        .about("Expense per category")
                        .arg(optional("month", "Only this YYYY-MM")),
                ))
                .subcommand(json_flags(
                    Command::new("trend").about("Income and expense over time").arg(
                        Arg::new("weekly")
                            .long("weekly")
                            .action(ArgAction::SetTrue)
                            .help("Bucket by week instead of month"),
                    ),
                )),
        )
        .subcommand(
            Command::new("currency")
                .about("Display currency")
                .subcommand_required(true)
                .subcommand(json_flags(Command::new("list").about("Known currencies")))
                .subcommand(
                    Command::new("set")
                        .about("Choose the display currency")
                        .arg(Arg::new("code").required(true)),
                )
                .subcommand(
                    Command::new("convert")
                        .about("Convert an amount between currencies")
                        .arg(required("amount", "Amount"))
                        .arg(required("from", "Source currency"))
                        .arg(required("to", "Target currency")),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Engine thresholds")
                .subcommand_required(true)
                .subcommand(json_flags(Command::new("show").about("Effective configuration")))
                .subcommand(
                    Command::new("set")
                        .about("Override a threshold")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("Re-evaluate alerts periodically")
                .arg(optional("interval", "Seconds between evaluations (default from config)"))
                .arg(
                    Arg::new("ticks")
                        .long("ticks")
                        .value_parser(clap::value_parser!(u64))
                        .help("Stop after this many evaluations"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn globals_reach_subcommands() {
        let m = build_cli().get_matches_from([
            "pennywise",
            "alerts",
            "list",
            "--now",
            "2025-11-10",
            "--unread",
        ]);
        let (_, alerts) = m.subcommand().unwrap();
        let (_, list) = alerts.subcommand().unwrap();
        assert_eq!(list.get_one::<String>("now").unwrap(), "2025-11-10");
        assert!(list.get_flag("unread"));
    }
}
