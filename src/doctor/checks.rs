use chrono::Utc;

use crate::bootstrap::AppPaths;
use crate::config::AppConfig;
use crate::doctor::report::{CheckResult, CheckStatus, DoctorReport, DoctorState};

pub fn run_doctor(paths: &AppPaths, config: &AppConfig) -> DoctorReport {
    let mut checks = Vec::new();

    checks.push(check_capture_tool(config));
    checks.push(check_save_directory(config));
    checks.push(check_api_key(config));
    checks.push(check_base_url(config));
    checks.push(check_config_file(paths));

    let required_failed = checks
        .iter()
        .any(|check| check.required && check.status == CheckStatus::Fail);
    let any_degraded = checks
        .iter()
        .any(|check| matches!(check.status, CheckStatus::Warn | CheckStatus::Fail));

    let state = if required_failed {
        DoctorState::Unavailable
    } else if any_degraded {
        DoctorState::Degraded
    } else {
        DoctorState::Ready
    };

    DoctorReport {
        generated_at: Utc::now().to_rfc3339(),
        state,
        checks,
    }
}

fn check_capture_tool(config: &AppConfig) -> CheckResult {
    let tool = &config.capture_tool;
    let resolved = if tool.components().count() > 1 {
        tool.is_file().then(|| tool.clone())
    } else {
        which::which(tool).ok()
    };

    match resolved {
        Some(path) => CheckResult {
            name: "capture tool".to_owned(),
            status: CheckStatus::Pass,
            detail: format!("found at {}", path.display()),
            required: true,
            remediation: None,
        },
        None => CheckResult {
            name: "capture tool".to_owned(),
            status: CheckStatus::Fail,
            detail: format!("{} not found", tool.display()),
            required: true,
            remediation: Some(
                "Install grimblast or point capture_tool at another capture helper.".to_owned(),
            ),
        },
    }
}

fn check_save_directory(config: &AppConfig) -> CheckResult {
    if !config.save_to_disk {
        return CheckResult {
            name: "save directory".to_owned(),
            status: CheckStatus::Skip,
            detail: "save_to_disk is disabled".to_owned(),
            required: false,
            remediation: None,
        };
    }

    let dir = &config.save_directory;
    let writable = std::fs::create_dir_all(dir).is_ok() && {
        let probe = dir.join(".shotput-doctor");
        match std::fs::write(&probe, b"probe") {
            Ok(()) => {
                let _ = std::fs::remove_file(&probe);
                true
            }
            Err(_) => false,
        }
    };

    if writable {
        CheckResult {
            name: "save directory".to_owned(),
            status: CheckStatus::Pass,
            detail: format!("writable at {}", dir.display()),
            required: true,
            remediation: None,
        }
    } else {
        CheckResult {
            name: "save directory".to_owned(),
            status: CheckStatus::Fail,
            detail: format!("cannot write to {}", dir.display()),
            required: true,
            remediation: Some("Create the directory or change save_directory.".to_owned()),
        }
    }
}

fn check_api_key(config: &AppConfig) -> CheckResult {
    if config.api_key.trim().is_empty() {
        CheckResult {
            name: "api key".to_owned(),
            status: CheckStatus::Warn,
            detail: "not set; the first capture will prompt for it".to_owned(),
            required: false,
            remediation: Some("Set api_key in the config file or SHOTPUT_API_KEY.".to_owned()),
        }
    } else {
        CheckResult {
            name: "api key".to_owned(),
            status: CheckStatus::Pass,
            detail: "configured".to_owned(),
            required: false,
            remediation: None,
        }
    }
}

fn check_base_url(config: &AppConfig) -> CheckResult {
    let url = config.base_url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        CheckResult {
            name: "upload endpoint".to_owned(),
            status: CheckStatus::Pass,
            detail: url.to_owned(),
            required: false,
            remediation: None,
        }
    } else {
        CheckResult {
            name: "upload endpoint".to_owned(),
            status: CheckStatus::Warn,
            detail: format!("{url} does not look like an http(s) url"),
            required: false,
            remediation: Some("Check base_url in the config file.".to_owned()),
        }
    }
}

fn check_config_file(paths: &AppPaths) -> CheckResult {
    if paths.config_file.exists() {
        CheckResult {
            name: "config file".to_owned(),
            status: CheckStatus::Pass,
            detail: format!("using {}", paths.config_file.display()),
            required: false,
            remediation: None,
        }
    } else {
        CheckResult {
            name: "config file".to_owned(),
            status: CheckStatus::Warn,
            detail: format!(
                "{} not written yet; defaults in effect",
                paths.config_file.display()
            ),
            required: false,
            remediation: None,
        }
    }
}
