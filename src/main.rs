mod config;
mod credentials;
mod error;
mod gitlab;
mod http;

use std::env;
use std::process::{self, Command, Stdio};

use getopts::Options;

use crate::config::Config;
use crate::error::Error;
use crate::gitlab::MergeRequestSource;

/// Capability to open a URL in the user's browser, injected so the side
/// effect can be stubbed in tests.
trait OpenUrl {
    fn open(&self, url: &str) -> Result<(), Error>;
}

/// Launches the configured browser command detached; the process is not
/// awaited and its stdio is discarded so it can't pollute the status block.
struct BrowserOpener<'a> {
    command: &'a str,
}

impl OpenUrl for BrowserOpener<'_> {
    fn open(&self, url: &str) -> Result<(), Error> {
        Command::new(self.command)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(Error::Browser)
    }
}

#[derive(Debug, PartialEq)]
struct Report {
    approved: usize,
    open: usize,
}

impl Report {
    fn status_line(&self, config: &Config) -> String {
        format!(
            "{}{}{} / {}{}",
            config.label,
            config.approved_merge_requests_label,
            self.approved,
            config.all_merge_requests_label,
            self.open
        )
    }

    fn verbose_line(&self) -> String {
        format!("MRs: {} / {}", self.approved, self.open)
    }

    // Signed comparison: an empty board (0 / 0) must render white.
    fn color(&self) -> &'static str {
        if (self.approved as i64) < self.open as i64 - 2 {
            "#FF0000"
        } else {
            "#FFFFFF"
        }
    }
}

/// Fetch open merge requests, drop WIPs, and count this user's approvals.
/// Approvals are fetched strictly one merge request at a time.
fn collect_report(config: &Config, source: &dyn MergeRequestSource) -> Result<Report, Error> {
    let open = gitlab::without_wip(source.open_merge_requests()?);
    let approved = gitlab::approved_mr_count(source, config.user_id, &open)?;

    Ok(Report {
        approved,
        open: open.len(),
    })
}

fn open_group_page(config: &Config, opener: &dyn OpenUrl) -> Result<(), Error> {
    opener.open(&gitlab::group_merge_requests_url(
        &config.base_url,
        &config.group_name,
    ))
}

fn default_config_path() -> Result<String, Error> {
    let home = env::var("HOME")?;

    Ok(format!("{}/.i3block-gitlab", home))
}

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options] [open-browser]", program);
    print!("{}", opts.usage(&brief));
}

fn run() -> Result<(), Error> {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("c", "config", "config file name", "CONFIG");
    opts.optflag("h", "help", "print this help menu");
    let matches = opts.parse(&args[1..])?;
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return Ok(());
    }

    let config_filename = match matches.opt_str("c") {
        Some(filename) => filename,
        None => default_config_path()?,
    };

    let config = config::parse(&config_filename)?;

    // Any extra positional argument opens the group's MR page, before any
    // credential or network access.
    if !matches.free.is_empty() {
        open_group_page(
            &config,
            &BrowserOpener {
                command: &config.web_browser,
            },
        )?;
    }

    let token = credentials::lookup()?;
    let client = http::Client::new(token);
    let api = gitlab::Api::new(&client, &config.base_url, config.group_id);

    let report = collect_report(&config, &api)?;

    println!("{}", report.status_line(&config));
    println!("{}", report.verbose_line());
    println!("{}", report.color());

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("mr-state: {}", err);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::{Approval, ApprovalResponse, MergeRequest, MergeRequestRef, User};
    use std::cell::RefCell;

    fn test_config() -> Config {
        Config {
            group_id: 44,
            group_name: "mygroup".to_string(),
            base_url: "https://gitlab.com".to_string(),
            user_id: 13,
            web_browser: "chromium".to_string(),
            label: "GitLab:".to_string(),
            approved_merge_requests_label: "Approved Gitlab MRs:".to_string(),
            all_merge_requests_label: "All MRs:".to_string(),
        }
    }

    /// Canned GitLab: per-MR approver ids keyed by (project_id, iid).
    struct StubSource {
        open: Vec<MergeRequest>,
        approvers: Vec<((u64, u64), Vec<u64>)>,
    }

    impl MergeRequestSource for StubSource {
        fn open_merge_requests(&self) -> Result<Vec<MergeRequest>, Error> {
            Ok(self.open.clone())
        }

        fn approvals(&self, mr: &MergeRequestRef) -> Result<ApprovalResponse, Error> {
            let approved_by = self
                .approvers
                .iter()
                .find(|(key, _)| *key == (mr.project_id, mr.iid))
                .map(|(_, ids)| ids.as_slice())
                .unwrap_or(&[])
                .iter()
                .map(|&id| Approval { user: User { id } })
                .collect();

            Ok(ApprovalResponse { approved_by })
        }
    }

    struct RecordingOpener {
        opened: RefCell<Vec<String>>,
    }

    impl OpenUrl for RecordingOpener {
        fn open(&self, url: &str) -> Result<(), Error> {
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }
    }

    fn merge_request(project_id: u64, iid: u64, title: &str) -> MergeRequest {
        MergeRequest {
            project_id,
            iid,
            title: title.to_string(),
        }
    }

    #[test]
    fn report_lines_match_the_block_format() {
        let report = Report {
            approved: 3,
            open: 5,
        };

        assert_eq!(
            report.status_line(&test_config()),
            "GitLab:Approved Gitlab MRs:3 / All MRs:5"
        );
        assert_eq!(report.verbose_line(), "MRs: 3 / 5");
    }

    #[test]
    fn report_lines_without_labels() {
        let mut config = test_config();
        config.label.clear();
        config.approved_merge_requests_label.clear();
        config.all_merge_requests_label.clear();

        let report = Report {
            approved: 0,
            open: 0,
        };

        assert_eq!(report.status_line(&config), "0 / 0");
    }

    #[test]
    fn formatting_is_idempotent() {
        let report = Report {
            approved: 2,
            open: 4,
        };
        let config = test_config();

        assert_eq!(report.status_line(&config), report.status_line(&config));
        assert_eq!(report.verbose_line(), report.verbose_line());
        assert_eq!(report.color(), report.color());
    }

    #[test]
    fn color_is_red_when_more_than_two_behind() {
        assert_eq!(Report { approved: 1, open: 5 }.color(), "#FF0000");
        assert_eq!(Report { approved: 4, open: 5 }.color(), "#FFFFFF");
        assert_eq!(Report { approved: 5, open: 8 }.color(), "#FFFFFF");
        assert_eq!(Report { approved: 0, open: 0 }.color(), "#FFFFFF");
    }

    #[test]
    fn collect_report_filters_wip_and_counts_approvals() {
        let source = StubSource {
            open: vec![
                merge_request(1, 10, "Fix bug"),
                merge_request(1, 11, "Add feature"),
                merge_request(2, 12, "WIP: Some fixes"),
            ],
            approvers: vec![
                ((1, 10), vec![13, 7]),
                ((1, 11), vec![7]),
                // The WIP merge request's approvals must never be fetched.
                ((2, 12), vec![13]),
            ],
        };

        let report = collect_report(&test_config(), &source).unwrap();

        assert_eq!(report, Report { approved: 1, open: 2 });
    }

    #[test]
    fn collect_report_of_empty_group_is_zero() {
        let source = StubSource {
            open: vec![],
            approvers: vec![],
        };

        let report = collect_report(&test_config(), &source).unwrap();

        assert_eq!(report, Report { approved: 0, open: 0 });
        assert_eq!(report.color(), "#FFFFFF");
    }

    #[test]
    fn open_group_page_points_at_the_group_merge_requests() {
        let opener = RecordingOpener {
            opened: RefCell::new(vec![]),
        };

        open_group_page(&test_config(), &opener).unwrap();

        assert_eq!(
            *opener.opened.borrow(),
            vec!["https://gitlab.com/groups/mygroup/-/merge_requests".to_string()]
        );
    }
}
