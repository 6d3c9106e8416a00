use std::fs::{self, File};
use std::io::{self, Write};

use tempfile::TempDir;

use crate::internals::delete_with;
use crate::{Error, GUID, MAX_CUSTOM_DATA_SIZE};

const TEST_TAG: u32 = 0x0000_0100;
const TEST_GUID: GUID = GUID {
    data1: 0x1111_1111,
    data2: 0x2222,
    data3: 0x3333,
    data4: [0x44, 0x44, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55],
};

fn guid_eq(a: &GUID, b: &GUID) -> bool {
    (a.data1, a.data2, a.data3, a.data4) == (b.data1, b.data2, b.data3, b.data4)
}

fn create_tempdir() -> TempDir {
    tempfile::Builder::new()
        .prefix("reparse-test-")
        .tempdir_in("target/debug")
        .unwrap()
}

#[test]
fn exists_is_false_without_reparse_point() {
    let tmpdir = create_tempdir();
    assert!(!crate::exists(tmpdir.path().join("missing")));

    let file = tmpdir.path().join("file");
    File::create(&file).unwrap().write_all(b"foo").unwrap();
    assert!(!crate::exists(&file));

    let dir = tmpdir.path().join("dir");
    fs::create_dir(&dir).unwrap();
    assert!(!crate::exists(dir));
}

#[test]
fn queries_require_a_reparse_point() {
    let tmpdir = create_tempdir();
    let file = tmpdir.path().join("file");
    File::create(&file).unwrap().write_all(b"foo").unwrap();

    assert!(matches!(crate::get_tag(&file), Err(Error::NotAReparsePoint)));
    assert!(matches!(crate::get_guid(&file), Err(Error::NotAReparsePoint)));
    assert!(matches!(crate::get_data(&file), Err(Error::NotAReparsePoint)));
}

#[test]
fn delete_without_reparse_point_keeps_failing() {
    let tmpdir = create_tempdir();
    let dir = tmpdir.path().join("dir");
    fs::create_dir(&dir).unwrap();

    // Never partially succeeds: the same error comes back every time.
    for _ in 0..2 {
        assert!(matches!(crate::delete(&dir), Err(Error::NotAReparsePoint)));
    }
    assert!(matches!(
        crate::delete(tmpdir.path().join("missing")),
        Err(Error::NotAReparsePoint)
    ));
}

#[test]
fn payload_validation_happens_before_any_open() {
    // The path does not exist: reaching the open would surface
    // HandleOpenFailed instead of InvalidArgument.
    let missing = r"C:\reparse-test-no-such-dir\blob";

    assert!(matches!(
        crate::create_custom(missing, &[], &TEST_GUID, TEST_TAG),
        Err(Error::InvalidArgument(_))
    ));

    let oversized = vec![0u8; MAX_CUSTOM_DATA_SIZE + 1];
    assert!(matches!(
        crate::create_custom(missing, &oversized, &TEST_GUID, TEST_TAG),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn create_on_missing_path_reports_open_failure() {
    let tmpdir = create_tempdir();
    let missing = tmpdir.path().join("missing");

    assert!(matches!(
        crate::create_custom(&missing, &[0xAA], &TEST_GUID, TEST_TAG),
        Err(Error::HandleOpenFailed(_))
    ));
    assert!(!crate::exists(missing));
}

#[test_log::test]
fn round_trip_on_a_file() {
    let tmpdir = create_tempdir();
    let file = tmpdir.path().join("blob");
    File::create(&file).unwrap();

    let payload = [0xAA, 0xBB, 0xCC];
    crate::create_custom(&file, &payload, &TEST_GUID, TEST_TAG).unwrap();

    assert!(crate::exists(&file));
    assert_eq!(crate::get_tag(&file).unwrap(), TEST_TAG);
    assert!(guid_eq(&crate::get_guid(&file).unwrap(), &TEST_GUID));
    assert_eq!(crate::get_data(&file).unwrap(), payload);

    crate::delete(&file).unwrap();
    assert!(!crate::exists(&file));
    assert!(file.exists(), "only the attribute is removed, not the file");
}

#[test_log::test]
fn round_trip_on_a_directory() {
    let tmpdir = create_tempdir();
    let dir = tmpdir.path().join("link");
    fs::create_dir(&dir).unwrap();

    let payload = [0xAA, 0xBB, 0xCC];
    crate::create_custom(&dir, &payload, &TEST_GUID, TEST_TAG).unwrap();

    assert!(crate::exists(&dir));
    assert_eq!(crate::get_tag(&dir).unwrap(), TEST_TAG);
    assert!(guid_eq(&crate::get_guid(&dir).unwrap(), &TEST_GUID));
    assert_eq!(crate::get_data(&dir).unwrap(), payload);

    crate::delete(&dir).unwrap();
    assert!(!crate::exists(&dir));
    assert!(dir.is_dir());
}

#[test_log::test]
fn payload_at_maximum_size_is_accepted() {
    let tmpdir = create_tempdir();
    let file = tmpdir.path().join("blob");
    File::create(&file).unwrap();

    let payload = vec![0x5A; MAX_CUSTOM_DATA_SIZE];
    crate::create_custom(&file, &payload, &TEST_GUID, TEST_TAG).unwrap();
    assert_eq!(crate::get_data(&file).unwrap(), payload);

    crate::delete(&file).unwrap();
}

#[test]
fn delete_falls_back_to_guid_layout_in_order() {
    let mut guids_seen = Vec::new();
    let result = delete_with(TEST_TAG, TEST_GUID, |rgdb| {
        assert_eq!(rgdb.ReparseTag, TEST_TAG);
        guids_seen.push(rgdb.ReparseGuid.data1);
        if guids_seen.len() == 1 {
            Err(io::Error::other("tag-only layout rejected"))
        } else {
            Ok(())
        }
    });

    assert!(result.is_ok());
    // Exactly two requests: zeroed GUID first, the caller's GUID second.
    assert_eq!(guids_seen, [0, TEST_GUID.data1]);
}

#[test]
fn delete_stops_after_first_accepted_attempt() {
    let mut calls = 0;
    let result = delete_with(TEST_TAG, TEST_GUID, |rgdb| {
        calls += 1;
        assert_eq!(rgdb.ReparseGuid.data1, 0);
        Ok(())
    });

    assert!(result.is_ok());
    assert_eq!(calls, 1);
}

#[test]
fn delete_reports_second_failure_as_is() {
    let mut calls = 0;
    let err = delete_with(TEST_TAG, TEST_GUID, |_| {
        calls += 1;
        Err(io::Error::other(format!("attempt {calls}")))
    })
    .unwrap_err();

    assert_eq!(calls, 2);
    assert_eq!(err.to_string(), "attempt 2");
}
