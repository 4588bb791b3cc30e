use super::*;
use crate::process::testing::FakeRunner;
use crate::process::CommandOutput;
use std::fs;
use tempfile::tempdir;

#[tokio::test]
async fn missing_dir_is_shallow_cloned() {
    let temp = tempdir().unwrap();
    let dir = temp.path().join("repos/server");

    let runner = FakeRunner::succeeding();
    let outcome = ensure_repo(&runner, "https://example.com/mcp.git", &dir).await.unwrap();

    assert_eq!(outcome.action, RepoAction::Cloned);
    assert_eq!(outcome.dir, dir);

    let calls = runner.recorded();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args[..3], ["clone", "--depth", "1"]);
    assert_eq!(calls[0].args[3], "https://example.com/mcp.git");
}

#[tokio::test]
async fn existing_clone_is_fast_forwarded() {
    let temp = tempdir().unwrap();
    let dir = temp.path().join("server");
    fs::create_dir_all(dir.join(".git")).unwrap();

    let runner = FakeRunner::succeeding();
    let outcome = ensure_repo(&runner, "https://example.com/mcp.git", &dir).await.unwrap();

    assert_eq!(outcome.action, RepoAction::Updated);

    let calls = runner.recorded();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args, vec!["pull", "--ff-only"]);
    assert_eq!(calls[0].current_dir.as_deref(), Some(dir.as_path()));
}

#[tokio::test]
async fn non_repo_dir_is_refused_untouched() {
    let temp = tempdir().unwrap();
    let dir = temp.path().join("precious");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("data.txt"), "user content").unwrap();

    let runner = FakeRunner::succeeding();
    let err = ensure_repo(&runner, "https://example.com/mcp.git", &dir).await.unwrap_err();

    let err = err.downcast::<SkillkitError>().unwrap();
    assert!(matches!(err, SkillkitError::NotAGitRepo { .. }));
    // Nothing was run and nothing was modified
    assert_eq!(runner.call_count(), 0);
    assert_eq!(fs::read_to_string(dir.join("data.txt")).unwrap(), "user content");
}

#[tokio::test]
async fn diverged_clone_surfaces_fast_forward_failure() {
    let temp = tempdir().unwrap();
    let dir = temp.path().join("server");
    fs::create_dir_all(dir.join(".git")).unwrap();

    let runner = FakeRunner::new(|spec| {
        Err(SkillkitError::CommandFailed {
            program: spec.program.clone(),
            operation: spec.operation.clone(),
            stderr: "fatal: Not possible to fast-forward, aborting.".to_string(),
        }
        .into())
    });

    let err = ensure_repo(&runner, "https://example.com/mcp.git", &dir).await.unwrap_err();
    let err = err.downcast::<SkillkitError>().unwrap();
    match err {
        SkillkitError::FastForwardFailed { reason, .. } => {
            assert!(reason.contains("fast-forward"));
        }
        other => panic!("expected FastForwardFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn clone_failure_carries_url_and_stderr() {
    let temp = tempdir().unwrap();
    let dir = temp.path().join("server");

    let runner = FakeRunner::new(|spec| {
        Err(SkillkitError::CommandFailed {
            program: spec.program.clone(),
            operation: spec.operation.clone(),
            stderr: "fatal: repository not found".to_string(),
        }
        .into())
    });

    let err = ensure_repo(&runner, "https://example.com/missing.git", &dir).await.unwrap_err();
    let err = err.downcast::<SkillkitError>().unwrap();
    match err {
        SkillkitError::GitCloneFailed { url, reason } => {
            assert_eq!(url, "https://example.com/missing.git");
            assert!(reason.contains("not found"));
        }
        other => panic!("expected GitCloneFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn build_commands_run_in_order_and_abort_on_failure() {
    let temp = tempdir().unwrap();
    let dir = temp.path().to_path_buf();

    let runner = FakeRunner::new(|spec| {
        if spec.program == "npm" && spec.args.contains(&"build".to_string()) {
            Err(SkillkitError::CommandFailed {
                program: spec.program.clone(),
                operation: spec.operation.clone(),
                stderr: "build script failed".to_string(),
            }
            .into())
        } else {
            Ok(CommandOutput::default())
        }
    });

    let commands = vec![
        "npm install".to_string(),
        "npm run build".to_string(),
        "npm run package".to_string(),
    ];
    let result = run_build_commands(&runner, &dir, &commands).await;

    assert!(result.is_err());
    // Third command never ran
    assert_eq!(runner.call_count(), 2);
    let calls = runner.recorded();
    assert_eq!(calls[0].args, vec!["install"]);
    assert_eq!(calls[0].current_dir.as_deref(), Some(dir.as_path()));
}

#[tokio::test]
async fn blank_build_commands_are_skipped() {
    let temp = tempdir().unwrap();
    let runner = FakeRunner::succeeding();
    run_build_commands(&runner, temp.path(), &[String::new(), "  ".to_string()]).await.unwrap();
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn find_skills_dir_respects_priority_order() {
    let temp = tempdir().unwrap();
    let repo = temp.path();
    fs::create_dir_all(repo.join("docs/skills")).unwrap();
    fs::create_dir_all(repo.join(".claude/skills")).unwrap();

    let found = find_skills_dir(repo, SKILLS_DIR_CANDIDATES).unwrap();
    assert_eq!(found, repo.join("docs/skills"));
}

#[test]
fn find_skills_dir_returns_none_without_candidates_present() {
    let temp = tempdir().unwrap();
    assert!(find_skills_dir(temp.path(), SKILLS_DIR_CANDIDATES).is_none());
}

#[test]
fn copy_skills_overwrites_target() {
    let temp = tempdir().unwrap();
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    fs::create_dir_all(src.join("audit")).unwrap();
    fs::write(src.join("audit/SKILL.md"), "fresh").unwrap();
    fs::create_dir_all(dst.join("audit")).unwrap();
    fs::write(dst.join("audit/SKILL.md"), "stale").unwrap();

    copy_skills(&src, &dst).unwrap();
    assert_eq!(fs::read_to_string(dst.join("audit/SKILL.md")).unwrap(), "fresh");
}
