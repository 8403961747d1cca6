use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeZone};
use woodsman::{
    log_dir_warning, CallSite, Level, Logger, Options, Severity, TraceLocation,
};

use common::{capture_logger, contents, BrokenSink, CaptureSink};

mod common;

fn fixed_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap() + chrono::Duration::microseconds(678901)
}

/// The header is a binary contract: severity letter glued to the date,
/// six microsecond digits, pid right-justified in seven columns, then
/// `shortfile:line] `.
#[test]
fn header_format() {
    let (mut logger, bufs) = capture_logger();
    logger.set_time_source(fixed_time);

    let line = line!() + 1;
    logger.info(format_args!("test"));

    let expect = format!(
        "I0102 15:04:05.678901 {:>7} woodsman_test.rs:{}] test\n",
        std::process::id(),
        line
    );
    assert_eq!(contents(&bufs, Severity::Info), expect);
}

/// Parsing the documented format back out recovers the pid and line.
#[test]
fn header_round_trip() {
    let (mut logger, bufs) = capture_logger();
    logger.set_time_source(fixed_time);

    let line = line!() + 1;
    logger.info(format_args!("round trip"));

    let text = contents(&bufs, Severity::Info);
    let rest = text
        .strip_prefix("I0102 15:04:05.678901")
        .expect("date prefix");
    let mut fields = rest.trim_start().splitn(2, ' ');
    let pid: u32 = fields.next().unwrap().parse().unwrap();
    let site = fields.next().unwrap();
    let parsed_line: u32 = site
        .split(':')
        .nth(1)
        .and_then(|s| s.split(']').next())
        .unwrap()
        .parse()
        .unwrap();

    assert_eq!(pid, std::process::id());
    assert_eq!(parsed_line, line);
}

#[test]
fn info_goes_to_info_sink() {
    let (logger, bufs) = capture_logger();
    logger.info(format_args!("test"));

    let text = contents(&bufs, Severity::Info);
    assert!(text.starts_with('I'), "Info has wrong character: {text:?}");
    assert!(text.contains("test"));
}

/// A Warning record cascades into the Info sink, keeping the W marker, so
/// the bytes are identical in both.
#[test]
fn warning_cascades_to_info() {
    let (logger, bufs) = capture_logger();
    logger.warning(format_args!("test"));

    let warning = contents(&bufs, Severity::Warning);
    assert!(warning.starts_with('W'));
    assert!(warning.contains("test"));
    assert_eq!(warning, contents(&bufs, Severity::Info));
}

/// An Error record lands in Error, Warning and Info, byte-identical, and
/// never in the Fatal sink.
#[test]
fn error_cascades_below_and_not_above() {
    let (logger, bufs) = capture_logger();
    logger.error(format_args!("test"));

    let error = contents(&bufs, Severity::Error);
    assert!(error.starts_with('E'), "Error has wrong character: {error:?}");
    assert!(error.contains("test"));
    assert_eq!(error, contents(&bufs, Severity::Warning));
    assert_eq!(error, contents(&bufs, Severity::Info));
    assert!(contents(&bufs, Severity::Fatal).is_empty());
}

/// A verbose record at an enabled level goes to the Info sink.
#[test]
fn v_logs_to_info() {
    let (logger, bufs) = capture_logger();
    logger.set_verbosity(Level(2));
    logger.v(Level(2)).info(format_args!("test"));

    let text = contents(&bufs, Severity::Info);
    assert!(text.starts_with('I'));
    assert!(text.contains("test"));
}

#[test]
fn v_disabled_by_default() {
    let (logger, bufs) = capture_logger();
    logger.v(Level(1)).info(format_args!("should not appear"));
    assert!(contents(&bufs, Severity::Info).is_empty());
}

/// A vmodule override for this file enables levels up to its value.
#[test]
fn vmodule_on() {
    let (logger, bufs) = capture_logger();
    logger.set_vmodule("woodsman_test=2").unwrap();

    assert!(logger.v(Level(1)).is_enabled(), "V not enabled for 1");
    assert!(logger.v(Level(2)).is_enabled(), "V not enabled for 2");
    assert!(!logger.v(Level(3)).is_enabled(), "V enabled for 3");

    logger.v(Level(2)).info(format_args!("test"));
    let text = contents(&bufs, Severity::Info);
    assert!(text.starts_with('I'));
    assert!(text.contains("test"));
}

/// A vmodule override for another file leaves this file at the global
/// threshold.
#[test]
fn vmodule_off() {
    let (logger, bufs) = capture_logger();
    logger.set_vmodule("notthisfile=2").unwrap();

    for level in 1..=3 {
        assert!(!logger.v(Level(level)).is_enabled(), "V enabled for {level}");
    }
    logger.v(Level(2)).info(format_args!("test"));
    assert!(contents(&bufs, Severity::Info).is_empty());
}

/// Call sites outside the overridden module fall back to the global
/// threshold, and that fallback is also the cached resolution.
#[test]
fn vmodule_other_modules_use_global() {
    let (logger, _bufs) = capture_logger();
    logger.set_vmodule("woodsman_test=2").unwrap();

    let other = CallSite::new("src/other_module.rs", 7);
    for level in 1..=3 {
        assert!(!logger.enabled(Level(level), other));
    }
    assert!(logger.enabled(Level(1), CallSite::new("tests/woodsman_test.rs", 7)));
}

fn v2_enabled_with(pattern: &str) -> bool {
    let (logger, _bufs) = capture_logger();
    logger.set_vmodule(pattern).unwrap();
    logger.v(Level(2)).is_enabled()
}

/// Globs match the whole module name of this file, `woodsman_test`.
#[test]
fn vmodule_glob_table() {
    for (pattern, expect) in [
        // numeric comparison against the override level
        ("woodsman_test=1", false),
        ("woodsman_test=2", true),
        ("woodsman_test=3", true),
        // pattern shapes, all at level 2
        ("*=2", true),
        ("?o*=2", true),
        ("*x=2", false),
        ("m*=2", false),
        ("??_*=2", false),
        ("?[abc]?_*t=2", false),
    ] {
        assert_eq!(
            v2_enabled_with(pattern),
            expect,
            "incorrect match for {pattern:?}"
        );
    }
}

/// Changing the override list must re-evaluate call sites whose previous
/// resolution was cached, in both directions.
#[test]
fn vmodule_change_invalidates_cache() {
    let (logger, _bufs) = capture_logger();
    let probe = |logger: &Logger| logger.v(Level(2)).is_enabled();

    logger.set_vmodule("notthisfile=2").unwrap();
    assert!(!probe(&logger));

    logger.set_vmodule("woodsman_test=2").unwrap();
    assert!(probe(&logger), "stale cached resolution survived");

    logger.set_vmodule("").unwrap();
    assert!(!probe(&logger));
}

/// Arming the backtrace trap at the exact file:line of an Info call makes
/// that record carry the location token twice: header and trace body.
#[test]
fn backtrace_at_info_call() {
    let (logger, bufs) = capture_logger();

    let info_line = line!() + 3;
    let trap: TraceLocation = format!("woodsman_test.rs:{info_line}").parse().unwrap();
    logger.set_backtrace_at(Some(trap));
    logger.info(format_args!("we want a stack trace here"));

    let text = contents(&bufs, Severity::Info);
    let token = format!("woodsman_test.rs:{info_line}");
    assert!(
        text.matches(&token).count() >= 2,
        "got no trace back; log is {text}"
    );

    // disarmed, the next record stays a single line
    logger.set_backtrace_at(None);
    logger.info(format_args!("no trace here"));
}

/// Forcing rotation with a tiny max size lands later records in a file
/// with a new name.
#[test]
fn rollover() {
    let dir = tempfile::tempdir().unwrap();
    let opts = Options {
        log_dir: Some(dir.path().to_path_buf()),
        max_size: 512,
        stderr_threshold: Severity::Fatal,
        ..common::test_options()
    };
    let logger = Logger::new(opts).unwrap();

    logger.info(format_args!("x"));
    logger.info(format_args!("{}", "x".repeat(512)));

    // the rotation timestamp has second resolution; names only change
    // once the clock advances
    std::thread::sleep(std::time::Duration::from_secs(1));
    logger.info(format_args!("x"));
    logger.flush_all();

    let info_files: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains(".log.INFO."))
        .collect();
    assert!(
        info_files.len() >= 2,
        "expected rotated INFO files, got {info_files:?}"
    );

    #[cfg(unix)]
    {
        let link = dir
            .path()
            .join(format!("{}.INFO", woodsman::rotate::program_name()));
        let target = std::fs::read_link(&link).unwrap();
        assert!(target.to_string_lossy().contains(".log.INFO."));
    }
}

/// The exit hook observes the end of a Fatal write exactly once, with no
/// error when every sink accepted the record.
#[test]
fn fatal_runs_exit_hook_once() {
    let (logger, bufs) = capture_logger();
    let calls: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = calls.clone();
    logger.set_exit_hook(Box::new(move |err| {
        seen.lock().unwrap().push(err.map(|e| e.to_string()));
    }));

    logger.fatal(format_args!("boom"));

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], None);

    // fatal cascades everywhere, with the F marker preserved
    for severity in Severity::all() {
        let text = contents(&bufs, severity);
        assert!(text.starts_with('F'));
        assert!(text.contains("boom"));
    }
}

/// A broken sink on the fatal path surfaces its error through the hook
/// instead of panicking or being swallowed.
#[test]
fn fatal_surfaces_sink_errors() {
    let logger = Logger::new(common::test_options()).unwrap();
    let buf = Arc::new(Mutex::new(Vec::new()));
    logger.swap_sinks([
        Some(Box::new(CaptureSink::new(buf.clone()))),
        Some(Box::new(CaptureSink::new(buf.clone()))),
        Some(Box::new(CaptureSink::new(buf.clone()))),
        Some(Box::new(BrokenSink)),
    ]);

    let calls: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = calls.clone();
    logger.set_exit_hook(Box::new(move |err| {
        seen.lock().unwrap().push(err.map(|e| e.to_string()));
    }));

    logger.fatal(format_args!("boom"));

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].as_deref().unwrap().contains("broken"));
}

/// A non-fatal record through a broken sink is best-effort: no panic, no
/// error surfaced, and the caller continues.
#[test]
fn non_fatal_write_errors_are_best_effort() {
    let logger = Logger::new(common::test_options()).unwrap();
    logger.swap_sinks([Some(Box::new(BrokenSink)), None, None, None]);
    logger.info(format_args!("dropped on the floor"));
}

/// Setter errors are synchronous values, never deferred.
#[test]
fn malformed_settings_are_rejected() {
    let (logger, _bufs) = capture_logger();
    assert!(logger.set_vmodule("woodsman_test").is_err());
    assert!(logger.set_vmodule("woodsman_test=high").is_err());
    assert!("nocolon".parse::<TraceLocation>().is_err());
    assert!("file.rs:0".parse::<TraceLocation>().is_err());
    assert!("NOISE".parse::<Severity>().is_err());

    // a rejected spec leaves the previous list in place
    logger.set_vmodule("woodsman_test=2").unwrap();
    assert!(logger.set_vmodule("bad spec").is_err());
    assert!(logger.v(Level(2)).is_enabled());
}

/// log_dir only matters when file logging is on; warn when it is set but
/// ignored.
#[test]
fn log_dir_warning_table() {
    assert!(!log_dir_warning(true, ""));
    assert!(!log_dir_warning(false, ""));
    assert!(!log_dir_warning(true, "/some/directory"));
    assert!(log_dir_warning(false, "/some/directory"));
}
