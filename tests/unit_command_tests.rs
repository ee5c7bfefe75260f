//! # Command Module Unit Tests / Command 模块单元测试
//!
//! Building launch specifications from cases and running them with output
//! capture, exit status checks, timeouts and cancellation.
//!
//! 根据用例构建启动规范，并在输出捕获、退出状态检查、超时和取消下运行它们。

use spectrum_regress::core::config::ComparisonCase;
use spectrum_regress::core::error::ComparisonError;
use spectrum_regress::infra::command::{LaunchSpec, run_launch, spawn_and_capture};
use std::time::Duration;
use tempfile::tempdir;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

fn command_case(command: &str) -> ComparisonCase {
    ComparisonCase {
        command: Some(command.to_string()),
        ..ComparisonCase::default()
    }
}

fn sh(script: &str) -> LaunchSpec {
    LaunchSpec {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
    }
}

#[cfg(test)]
mod launch_spec_tests {
    use super::*;

    #[test]
    fn test_command_string_is_split_like_a_shell() {
        let spec = LaunchSpec::from_case(&command_case(r#"./gomc --title "two words" -n 3"#)).unwrap();
        assert_eq!(spec.program, "./gomc");
        assert_eq!(spec.args, vec!["--title", "two words", "-n", "3"]);
    }

    #[test]
    fn test_program_and_args_are_used_verbatim() {
        let case = ComparisonCase {
            program: Some("./gomc".into()),
            args: vec!["$HOME".into(), "a b".into()],
            ..ComparisonCase::default()
        };
        let spec = LaunchSpec::from_case(&case).unwrap();
        assert_eq!(spec.args, vec!["$HOME", "a b"]);
    }

    #[test]
    fn test_unbalanced_quotes_fail_to_parse() {
        let err = LaunchSpec::from_case(&command_case(r#"./gomc "unterminated"#)).unwrap_err();
        assert!(matches!(err, ComparisonError::Spawn { .. }));
    }

    #[test]
    fn test_display_quotes_arguments() {
        assert_eq!(sh("echo hi").display(), "sh -c 'echo hi'");
    }
}

#[cfg(all(test, unix))]
mod run_launch_tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let dir = tempdir().unwrap();
        let outcome = run_launch(&sh("echo out; echo err >&2"), dir.path(), None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(outcome.status.success());
        assert!(outcome.output.contains("out"));
        assert!(outcome.output.contains("err"));
    }

    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let dir = tempdir().unwrap();
        run_launch(&sh("touch marker"), dir.path(), None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_an_error_with_output() {
        let dir = tempdir().unwrap();
        let err = run_launch(&sh("echo boom; exit 3"), dir.path(), None, &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            ComparisonError::ExternalCommand { output, .. } => assert!(output.contains("boom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_a_spawn_error() {
        let dir = tempdir().unwrap();
        let spec = LaunchSpec {
            program: "definitely-not-a-real-simulation".into(),
            args: vec![],
        };
        let err = run_launch(&spec, dir.path(), None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ComparisonError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_timeout_kills_the_process() {
        let dir = tempdir().unwrap();
        let err = run_launch(
            &sh("sleep 5"),
            dir.path(),
            Some(Duration::from_millis(200)),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ComparisonError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_run() {
        let dir = tempdir().unwrap();
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });
        let err = run_launch(&sh("sleep 5"), dir.path(), None, &token).await.unwrap_err();
        assert!(matches!(err, ComparisonError::Cancelled));
    }

    #[tokio::test]
    async fn test_spawn_and_capture_reports_status() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo captured; exit 1"]);
        let (status, output) = spawn_and_capture(cmd).await;
        assert!(!status.unwrap().success());
        assert!(output.contains("captured"));
    }
}
