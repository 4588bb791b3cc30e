use super::*;
use crate::catalog::Skill;
use crate::process::testing::FakeRunner;
use crate::process::CommandOutput;
use crate::core::SkillkitError;
use serde_json::Value;
use tempfile::tempdir;

fn skill(npm_name: &str) -> Skill {
    Skill::Name(npm_name.to_string())
}

/// Runner that plays the package manager: materializes a `SKILL.md` under
/// `node_modules` for each named package, inside the staging dir the spec
/// points at.
fn npm_faking_runner(packages_with_artifacts: Vec<String>) -> FakeRunner {
    FakeRunner::new(move |spec| {
        let staging = spec.current_dir.clone().expect("npm runs in the staging dir");
        for package in &packages_with_artifacts {
            let package_dir = staging.join("node_modules").join(package);
            std::fs::create_dir_all(&package_dir).unwrap();
            std::fs::write(package_dir.join(SKILL_ARTIFACT), format!("# {package}\n")).unwrap();
        }
        Ok(CommandOutput::default())
    })
}

#[tokio::test]
async fn fresh_install_places_artifacts_and_guide() {
    let temp = tempdir().unwrap();
    let staging = temp.path().join("staging");
    let target_dir = temp.path().join("skills");

    let runner = npm_faking_runner(vec!["a-skill".to_string(), "b-skill".to_string()]);
    let report = install(
        &runner,
        &[skill("a-skill"), skill("b-skill")],
        &[SkillTarget { path: target_dir.clone(), nest: false }],
        &staging,
        None,
        "SKILLS-GUIDE.md",
    )
    .await
    .unwrap();

    assert_eq!(report, InstallReport { installed: 2, placed: 2 });
    assert!(target_dir.join("a").join(SKILL_ARTIFACT).is_file());
    assert!(target_dir.join("b").join(SKILL_ARTIFACT).is_file());
    assert!(target_dir.join("SKILLS-GUIDE.md").is_file());
}

#[tokio::test]
async fn installed_count_is_normalized_per_target() {
    let temp = tempdir().unwrap();
    let staging = temp.path().join("staging");
    let skills: Vec<Skill> =
        ["one-skill", "two-skill", "three-skill"].iter().map(|s| skill(s)).collect();
    let targets = vec![
        SkillTarget { path: temp.path().join("t1"), nest: false },
        SkillTarget { path: temp.path().join("t2"), nest: false },
    ];

    let runner = npm_faking_runner(skills.iter().map(|s| s.npm_name().to_string()).collect());
    let report = install(&runner, &skills, &targets, &staging, None, "SKILLS-GUIDE.md")
        .await
        .unwrap();

    // 3 placements per target, 6 total, reported as 3 per target
    assert_eq!(report.placed, 6);
    assert_eq!(report.installed, 3);
}

#[tokio::test]
async fn missing_artifact_is_skipped_silently() {
    let temp = tempdir().unwrap();
    let staging = temp.path().join("staging");
    let target_dir = temp.path().join("skills");

    // Only one of the two packages ships a SKILL.md
    let runner = npm_faking_runner(vec!["documented-skill".to_string()]);
    let report = install(
        &runner,
        &[skill("documented-skill"), skill("bare-skill")],
        &[SkillTarget { path: target_dir.clone(), nest: false }],
        &staging,
        None,
        "SKILLS-GUIDE.md",
    )
    .await
    .unwrap();

    assert_eq!(report, InstallReport { installed: 1, placed: 1 });
    assert!(target_dir.join("documented").is_dir());
    assert!(!target_dir.join("bare").exists());
}

#[tokio::test]
async fn npm_failure_aborts_before_targets_are_touched() {
    let temp = tempdir().unwrap();
    let staging = temp.path().join("staging");
    let target_dir = temp.path().join("skills");

    let runner = FakeRunner::new(|spec| {
        Err(SkillkitError::CommandFailed {
            program: spec.program.clone(),
            operation: spec.operation.clone(),
            stderr: "E404 not found".to_string(),
        }
        .into())
    });

    let result = install(
        &runner,
        &[skill("a-skill")],
        &[SkillTarget { path: target_dir.clone(), nest: false }],
        &staging,
        None,
        "SKILLS-GUIDE.md",
    )
    .await;

    assert!(result.is_err());
    assert!(!target_dir.exists(), "no partial placement after npm failure");
    // Single invocation, no retry
    assert_eq!(runner.call_count(), 1);
}

#[tokio::test]
async fn staging_manifest_pins_every_package_to_latest() {
    let temp = tempdir().unwrap();
    let staging = temp.path().join("staging");

    let runner = npm_faking_runner(vec!["a-skill".to_string()]);
    install(
        &runner,
        &[skill("a-skill"), skill("b-skill")],
        &[SkillTarget { path: temp.path().join("skills"), nest: false }],
        &staging,
        None,
        "SKILLS-GUIDE.md",
    )
    .await
    .unwrap();

    let manifest: Value =
        serde_json::from_str(&std::fs::read_to_string(staging.join("package.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["private"], Value::Bool(true));
    assert_eq!(manifest["dependencies"]["a-skill"], "latest");
    assert_eq!(manifest["dependencies"]["b-skill"], "latest");

    let npm_call = &runner.recorded()[0];
    assert!(npm_call.args.contains(&"--omit=dev".to_string()));
    assert_eq!(npm_call.current_dir.as_deref(), Some(staging.as_path()));
}

#[tokio::test]
async fn nesting_targets_install_under_shared_subfolder() {
    let temp = tempdir().unwrap();
    let staging = temp.path().join("staging");
    let nested_target = temp.path().join("nested");
    let flat_target = temp.path().join("flat");

    let runner = npm_faking_runner(vec!["a-skill".to_string()]);
    install(
        &runner,
        &[skill("a-skill")],
        &[
            SkillTarget { path: nested_target.clone(), nest: true },
            SkillTarget { path: flat_target.clone(), nest: false },
        ],
        &staging,
        Some("skillkit"),
        "SKILLS-GUIDE.md",
    )
    .await
    .unwrap();

    assert!(nested_target.join("skillkit/a").join(SKILL_ARTIFACT).is_file());
    assert!(flat_target.join("a").join(SKILL_ARTIFACT).is_file());
}

#[tokio::test]
async fn uninstall_reverses_install() {
    let temp = tempdir().unwrap();
    let staging = temp.path().join("staging");
    let target_dir = temp.path().join("skills");
    let skills = vec![skill("a-skill"), skill("b-skill")];
    let targets = vec![SkillTarget { path: target_dir.clone(), nest: true }];

    let runner = npm_faking_runner(vec!["a-skill".to_string(), "b-skill".to_string()]);
    install(&runner, &skills, &targets, &staging, Some("skillkit"), "SKILLS-GUIDE.md")
        .await
        .unwrap();

    let report = uninstall(&skills, &targets, Some("skillkit"), "SKILLS-GUIDE.md").unwrap();

    assert_eq!(report, RemovalReport { removed: 2 });
    // Shared folder emptied out, so it goes too
    assert!(!target_dir.join("skillkit").exists());
}

#[test]
fn uninstall_keeps_shared_folder_with_foreign_content() {
    let temp = tempdir().unwrap();
    let target_dir = temp.path().join("skills");
    let shared = target_dir.join("skillkit");
    std::fs::create_dir_all(shared.join("a")).unwrap();
    std::fs::write(shared.join("a").join(SKILL_ARTIFACT), "# a\n").unwrap();
    std::fs::write(shared.join("user-notes.md"), "mine\n").unwrap();

    let report = uninstall(
        &[skill("a-skill")],
        &[SkillTarget { path: target_dir.clone(), nest: true }],
        Some("skillkit"),
        "SKILLS-GUIDE.md",
    )
    .unwrap();

    assert_eq!(report.removed, 1);
    assert!(shared.join("user-notes.md").is_file(), "foreign content survives");
    assert!(shared.exists());
}

#[test]
fn uninstall_counts_zero_when_nothing_installed() {
    let temp = tempdir().unwrap();
    let report = uninstall(
        &[skill("a-skill")],
        &[SkillTarget { path: temp.path().join("skills"), nest: false }],
        None,
        "SKILLS-GUIDE.md",
    )
    .unwrap();
    assert_eq!(report.removed, 0);
}

#[test]
fn cleanup_staging_is_idempotent() {
    let temp = tempdir().unwrap();
    let staging = temp.path().join("staging");
    std::fs::create_dir_all(staging.join("node_modules")).unwrap();

    cleanup_staging(&staging).unwrap();
    assert!(!staging.exists());

    // Already gone: still fine
    cleanup_staging(&staging).unwrap();
}
