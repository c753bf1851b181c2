//! Role delegation graph: nesting, duplicates and cycles

use grantbook::*;
use tempfile::TempDir;

fn setup() -> (TempDir, Catalog) {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::open_path(dir.path()).unwrap();
    (dir, catalog)
}

#[test]
fn nested_roles_are_transitive() {
    let (_dir, mut c) = setup();
    let (alice, reader, writer, admin) = c
        .transact(|s| {
            let alice = s.create_user("ALICE")?;
            let reader = s.create_role("READER")?;
            let writer = s.create_role("WRITER")?;
            let admin = s.create_role("ADMIN")?;
            s.grant_role(writer, reader)?;
            s.grant_role(admin, writer)?;
            s.grant_role(alice, admin)?;
            Ok((alice, reader, writer, admin))
        })
        .unwrap();

    assert!(c.is_role_granted(alice, reader));
    assert!(c.is_role_granted(alice, writer));
    assert!(c.is_role_granted(admin, reader));
    assert!(!c.is_role_granted(reader, admin));
    assert_eq!(c.role_members(reader), vec![writer]);
    assert_eq!(c.role_members(admin), vec![alice]);
}

#[test]
fn role_cannot_be_granted_to_itself() {
    let (_dir, mut c) = setup();
    let r = c.transact(|s| s.create_role("R")).unwrap();
    let e = c.transact(|s| s.grant_role(r, r)).unwrap_err();
    assert!(matches!(e, CatalogError::CircularRole { .. }));
}

#[test]
fn indirect_cycle_rejected() {
    let (_dir, mut c) = setup();
    let (a, cc) = c
        .transact(|s| {
            let a = s.create_role("A")?;
            let b = s.create_role("B")?;
            let cc = s.create_role("C")?;
            s.grant_role(a, b)?;
            s.grant_role(b, cc)?;
            Ok((a, cc))
        })
        .unwrap();

    let e = c.transact(|s| s.grant_role(cc, a)).unwrap_err();
    assert!(matches!(
        e,
        CatalogError::CircularRole { grantee, role } if grantee == cc && role == a
    ));
    assert!(!c.is_role_granted(cc, a));
    assert_eq!(c.grants_to(cc).len(), 0);
    assert!(c.is_role_granted(a, cc));
}

#[test]
fn duplicate_role_grant_rejected() {
    let (_dir, mut c) = setup();
    let (alice, r, first) = c
        .transact(|s| {
            let alice = s.create_user("ALICE")?;
            let r = s.create_role("R")?;
            let first = s.grant_role(alice, r)?;
            Ok((alice, r, first))
        })
        .unwrap();

    let e = c.transact(|s| s.grant_role(alice, r)).unwrap_err();
    assert!(matches!(e, CatalogError::DuplicateGrant { .. }));
    assert_eq!(c.principal(alice).unwrap().role_grant(r), Some(first));
    assert_eq!(c.grants().count(), 1);
}

#[test]
fn users_cannot_be_granted() {
    let (_dir, mut c) = setup();
    let (alice, bob) = c
        .transact(|s| Ok((s.create_user("ALICE")?, s.create_user("BOB")?)))
        .unwrap();
    let e = c.transact(|s| s.grant_role(alice, bob)).unwrap_err();
    assert!(matches!(e, CatalogError::NotARole(name) if name == "BOB"));
}

#[test]
fn users_and_roles_share_a_namespace() {
    let (_dir, mut c) = setup();
    c.transact(|s| s.create_user("ALICE")).unwrap();
    let e = c.transact(|s| s.create_role("ALICE")).unwrap_err();
    assert!(matches!(e, CatalogError::AlreadyExists { kind: "role", .. }));
}

#[test]
fn grants_to_lists_role_grants_first() {
    let (_dir, mut c) = setup();
    let (alice, rights, role) = c
        .transact(|s| {
            let alice = s.create_user("ALICE")?;
            let r = s.create_role("R")?;
            let rights = s.grant_rights(alice, PrivilegeSet::SELECT, None)?;
            let role = s.grant_role(alice, r)?;
            Ok((alice, rights, role))
        })
        .unwrap();
    let ids: Vec<GrantId> = c.grants_to(alice).iter().map(|g| g.id()).collect();
    assert_eq!(ids, vec![role, rights]);
}
