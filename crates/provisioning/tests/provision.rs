mod common;

use std::collections::BTreeSet;

use common::{roster, FakeOrg};
use provisioning::{
    DryRunAdmin, OrgRole, PermissionLevel, PlannedAction, ProvisionConfig, ProvisionError,
    Provisioner, Stage, TeamOutcome, TeamName, TeamScope,
};

const EXAMPLE_ROSTER: &str = "team_no,email\n5,a@x.com\n6,b@x.com";

fn config() -> ProvisionConfig {
    ProvisionConfig::new("acme", "Admins").unwrap()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn example_roster_provisions_teams_repositories_invitations_and_grants() {
    let org = FakeOrg::new();
    let config = config();

    let report = Provisioner::new(&org, &config)
        .run(&roster(EXAMPLE_ROSTER))
        .await
        .unwrap();

    assert_eq!(org.team_names(), set(&["Admins", "Team5", "Team6"]));
    assert_eq!(
        org.repositories(),
        set(&["Team5_BE", "Team5_FE", "Team6_BE", "Team6_FE"])
    );

    for (team, repos) in [("team5", ["Team5_BE", "Team5_FE"]), ("team6", ["Team6_BE", "Team6_FE"])] {
        for repo in repos {
            assert_eq!(org.grant(team, repo), Some(PermissionLevel::Push));
            assert_eq!(org.grant("admins", repo), Some(PermissionLevel::Admin));
        }
    }
    assert_eq!(org.grant_count(), 8);

    let admins = org.team("Admins").unwrap().id;
    let invitations = org.invitations();
    assert_eq!(invitations.len(), 2);
    assert_eq!(invitations[0].email.as_str(), "a@x.com");
    assert_eq!(invitations[0].team_ids, vec![org.team("Team5").unwrap().id, admins]);
    assert_eq!(invitations[0].role, OrgRole::DirectMember);
    assert_eq!(invitations[1].email.as_str(), "b@x.com");
    assert_eq!(invitations[1].team_ids, vec![org.team("Team6").unwrap().id, admins]);

    assert_eq!(report.teams_created, 3);
    assert_eq!(report.repositories_created, 4);
    assert_eq!(report.invitations_sent, 2);
    assert_eq!(report.grants_applied, 8);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn second_run_creates_nothing_new() {
    let org = FakeOrg::new();
    let config = config();
    let roster = roster(EXAMPLE_ROSTER);
    let provisioner = Provisioner::new(&org, &config);

    provisioner.run(&roster).await.unwrap();
    let teams_after_first = org.team_names();
    let repos_after_first = org.repositories();

    let second = provisioner.run(&roster).await.unwrap();

    assert_eq!(org.team_names(), teams_after_first);
    assert_eq!(org.repositories(), repos_after_first);
    assert_eq!(org.grant_count(), 8);
    assert_eq!(org.invitations().len(), 2);

    assert_eq!(second.teams_created, 0);
    assert_eq!(second.teams_found, 3);
    assert_eq!(second.repositories_created, 0);
    assert_eq!(second.repositories_existing, 4);
    assert_eq!(second.grants_applied, 8);
    assert_eq!(second.grants_failed, 0);
    // Duplicate invitations are expected on re-runs and only warn.
    assert_eq!(second.invitations_failed, 2);
    assert_eq!(second.warnings_in(Stage::Invitations).count(), 2);
}

#[tokio::test]
async fn existing_team_is_reused() {
    let org = FakeOrg::new().with_existing_team("Team5");
    let existing = org.team("Team5").unwrap();
    let config = config();

    let outcome = Provisioner::new(&org, &config)
        .ensure_team(&TeamName::new("Team5").unwrap())
        .await
        .unwrap();

    assert_eq!(outcome, TeamOutcome::Found(existing));
    assert_eq!(org.mutations(), 0);
}

#[tokio::test]
async fn malformed_rows_are_skipped_with_a_warning() {
    let org = FakeOrg::new();
    let config = config();
    let roster = roster("team_no,email\nseven,a@x.com\n5,b@x.com\n");

    let report = Provisioner::new(&org, &config).run(&roster).await.unwrap();

    assert_eq!(report.rows_skipped, 1);
    let roster_warnings: Vec<_> = report.warnings_in(Stage::Roster).collect();
    assert_eq!(roster_warnings.len(), 1);
    assert_eq!(roster_warnings[0].subject, "line 2");
    assert_eq!(org.team_names(), set(&["Admins", "Team5"]));
    assert_eq!(report.invitations_sent, 1);
}

#[tokio::test]
async fn fixed_range_scope_provisions_every_number_and_skips_rows_above_it() {
    let org = FakeOrg::new();
    let config = config().with_scope(TeamScope::from_max(Some(2)).unwrap());
    let roster = roster("team_no,email\n1,a@x.com\n3,c@x.com\n");

    let report = Provisioner::new(&org, &config).run(&roster).await.unwrap();

    assert_eq!(org.team_names(), set(&["Admins", "Team1", "Team2"]));
    assert_eq!(
        org.repositories(),
        set(&["Team1_BE", "Team1_FE", "Team2_BE", "Team2_FE"])
    );
    assert_eq!(report.rows_skipped, 1);
    assert_eq!(report.invitations_sent, 1);
    assert_eq!(org.invitations()[0].email.as_str(), "a@x.com");
    assert!(report
        .warnings_in(Stage::Roster)
        .any(|w| w.subject == "line 3" && w.message.contains("outside")));
}

#[tokio::test]
async fn dry_run_makes_no_mutations_and_records_every_intended_action() {
    let org = FakeOrg::new().with_existing_team("Admins");
    let config = config().with_dry_run(true).with_invite_role(OrgRole::Admin);
    let dry_run = DryRunAdmin::new(org);

    let report = Provisioner::new(&dry_run, &config)
        .run(&roster(EXAMPLE_ROSTER))
        .await
        .unwrap();

    assert!(report.dry_run);
    assert!(report.warnings.is_empty());

    let planned = dry_run.planned_actions();
    let count = |pred: fn(&PlannedAction) -> bool| planned.iter().filter(|a| pred(a)).count();
    assert_eq!(count(|a| matches!(a, PlannedAction::CreateTeam { .. })), 2);
    assert_eq!(count(|a| matches!(a, PlannedAction::CreateRepository { .. })), 4);
    assert_eq!(count(|a| matches!(a, PlannedAction::GrantPermission { .. })), 8);
    assert_eq!(count(|a| matches!(a, PlannedAction::Invite { .. })), 2);

    let invited_roles: Vec<_> = planned
        .iter()
        .filter_map(|a| match a {
            PlannedAction::Invite { invitation } => Some(invitation.role),
            _ => None,
        })
        .collect();
    assert_eq!(invited_roles, [OrgRole::Admin, OrgRole::Admin]);

    let org = dry_run.into_inner();
    assert_eq!(org.mutations(), 0);
    assert_eq!(org.team_names(), set(&["Admins"]));
    assert!(org.repositories().is_empty());
}

#[tokio::test]
async fn failed_invitation_does_not_stop_later_rows() {
    let org = FakeOrg::new().with_member("a@x.com");
    let config = config();

    let report = Provisioner::new(&org, &config)
        .run(&roster(EXAMPLE_ROSTER))
        .await
        .unwrap();

    assert_eq!(report.invitations_failed, 1);
    assert_eq!(report.invitations_sent, 1);
    let invitations = org.invitations();
    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0].email.as_str(), "b@x.com");
    let warning = report.warnings_in(Stage::Invitations).next().unwrap();
    assert_eq!(warning.subject, "a@x.com");
    // Later stages still ran.
    assert_eq!(report.repositories_created, 4);
}

#[tokio::test]
async fn team_created_concurrently_is_recovered_by_requery() {
    let mut org = FakeOrg::new();
    org.racing_team_creation.insert("Team6".into());
    let config = config();

    let report = Provisioner::new(&org, &config)
        .run(&roster(EXAMPLE_ROSTER))
        .await
        .unwrap();

    assert_eq!(org.team_names(), set(&["Admins", "Team5", "Team6"]));
    assert_eq!(report.teams_created, 2);
    assert_eq!(report.teams_found, 1);
    assert_eq!(report.teams_failed, 0);
    assert_eq!(report.warnings_in(Stage::Teams).count(), 1);
    assert_eq!(org.grant("team6", "Team6_BE"), Some(PermissionLevel::Push));
}

#[tokio::test]
async fn unresolvable_team_skips_its_invitations_and_push_grants_only() {
    let mut org = FakeOrg::new();
    org.reject_team_creation.insert("Team6".into());
    let config = config();

    let report = Provisioner::new(&org, &config)
        .run(&roster(EXAMPLE_ROSTER))
        .await
        .unwrap();

    assert_eq!(report.teams_failed, 1);
    assert_eq!(report.invitations_skipped, 1);
    assert_eq!(org.invitations().len(), 1);
    assert_eq!(report.grants_skipped, 2);
    // Repositories and admin bindings do not depend on the team.
    assert!(org.repositories().contains("Team6_FE"));
    assert_eq!(org.grant("admins", "Team6_FE"), Some(PermissionLevel::Admin));
    assert_eq!(org.grant("team6", "Team6_FE"), None);
}

#[tokio::test]
async fn unresolvable_admin_team_is_fatal() {
    let mut org = FakeOrg::new();
    org.reject_team_creation.insert("Admins".into());
    let config = config();

    let err = Provisioner::new(&org, &config)
        .run(&roster(EXAMPLE_ROSTER))
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::AdminTeamUnresolved { .. }));
    assert!(org.repositories().is_empty());
}

#[tokio::test]
async fn unreachable_organization_is_fatal_before_any_stage() {
    let mut org = FakeOrg::new();
    org.unreachable = true;
    let config = config();

    let err = Provisioner::new(&org, &config)
        .run(&roster(EXAMPLE_ROSTER))
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::OrganizationUnavailable { .. }));
    assert_eq!(org.mutations(), 0);
}

#[tokio::test]
async fn failed_repository_still_lets_permissions_run() {
    let mut org = FakeOrg::new();
    org.reject_repository_creation.insert("Team5_BE".into());
    let config = config();

    let report = Provisioner::new(&org, &config)
        .run(&roster(EXAMPLE_ROSTER))
        .await
        .unwrap();

    assert_eq!(report.repositories_failed, 1);
    assert_eq!(report.repositories_created, 3);
    let repo_warnings: Vec<_> = report.warnings_in(Stage::Repositories).collect();
    assert_eq!(repo_warnings.len(), 1);
    assert_eq!(repo_warnings[0].subject, "acme/Team5_BE");

    // Both bindings on the missing repository fail; the other six apply.
    assert_eq!(report.grants_applied, 6);
    assert_eq!(report.grants_failed, 2);
    assert_eq!(org.grant("team5", "Team5_FE"), Some(PermissionLevel::Push));
    assert_eq!(org.grant("admins", "Team5_BE"), None);
}

#[tokio::test]
async fn failed_admin_team_lookup_is_fatal() {
    let mut org = FakeOrg::new().with_existing_team("Admins");
    org.failing_team_lookup.insert("Admins".into());
    let config = config();

    let err = Provisioner::new(&org, &config)
        .run(&roster(EXAMPLE_ROSTER))
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::AdminTeamUnresolved { .. }));
    assert_eq!(org.mutations(), 0);
}

#[tokio::test]
async fn failed_numbered_team_lookup_is_a_warning() {
    let mut org = FakeOrg::new();
    org.failing_team_lookup.insert("Team6".into());
    let config = config();

    let report = Provisioner::new(&org, &config)
        .run(&roster(EXAMPLE_ROSTER))
        .await
        .unwrap();

    assert_eq!(report.teams_failed, 1);
    assert_eq!(report.teams_created, 2);
    let team_warnings: Vec<_> = report.warnings_in(Stage::Teams).collect();
    assert_eq!(team_warnings.len(), 1);
    assert_eq!(team_warnings[0].subject, "Team6");
    // No create was attempted after the failed lookup.
    assert_eq!(org.team_names(), set(&["Admins", "Team5"]));

    assert_eq!(report.invitations_sent, 1);
    assert_eq!(report.invitations_skipped, 1);
    assert_eq!(report.grants_skipped, 2);
    assert_eq!(org.grant("admins", "Team6_BE"), Some(PermissionLevel::Admin));
}
