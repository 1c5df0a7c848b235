mod common;

use pcdev::{AccessPolicy, BindError, PcdConfig, PcdDriver, PCD_IDS, UnbindError, default_platform_devices};

#[test]
fn test_identity_reuse_smallest_free() {
    common::init();
    let driver = PcdDriver::default();

    let a = driver
        .bind(&common::descriptor("pcdev-A1x", 16, AccessPolicy::ReadWrite))
        .unwrap();
    let b = driver
        .bind(&common::descriptor("pcdev-B1x", 16, AccessPolicy::ReadWrite))
        .unwrap();
    assert_eq!((a, b), (0, 1));

    driver.unbind(a).unwrap();
    let c = driver
        .bind(&common::descriptor("pcdev-C1x", 16, AccessPolicy::ReadOnly))
        .unwrap();
    assert_eq!(c, 0);
    assert_eq!(driver.identities(), vec![0, 1]);
}

#[test]
fn test_double_unbind_reports_not_bound() {
    common::init();
    let driver = PcdDriver::default();
    let id = driver
        .bind(&common::descriptor("pcdev-A1x", 8, AccessPolicy::ReadWrite))
        .unwrap();

    assert_eq!(driver.unbind(id), Ok(()));
    assert_eq!(driver.unbind(id), Err(UnbindError::NotBound));
    assert_eq!(driver.total_devices(), 0);
}

#[test]
fn test_unknown_name_is_not_handled() {
    common::init();
    let driver = PcdDriver::default();
    let err = driver
        .bind(&common::descriptor("other-dev", 8, AccessPolicy::ReadWrite))
        .unwrap_err();
    assert_eq!(err, BindError::NotHandled);
    assert_eq!(driver.total_devices(), 0);
}

#[test]
fn test_identity_space_exhaustion() {
    common::init();
    let driver = PcdDriver::with_config(
        PCD_IDS,
        PcdConfig {
            max_devices: 2,
            ..PcdConfig::default()
        },
    );
    let desc = common::descriptor("pcdev-A1x", 4, AccessPolicy::ReadWrite);

    assert_eq!(driver.bind(&desc), Ok(0));
    assert_eq!(driver.bind(&desc), Ok(1));
    assert_eq!(driver.bind(&desc), Err(BindError::NoFreeIdentity));
    assert_eq!(driver.total_devices(), 2);
}

#[test]
fn test_oversized_capacity_is_out_of_memory() {
    common::init();
    let driver = PcdDriver::default();
    let err = driver
        .bind(&common::descriptor(
            "pcdev-A1x",
            usize::MAX,
            AccessPolicy::ReadWrite,
        ))
        .unwrap_err();
    assert_eq!(err, BindError::OutOfMemory);
    assert_eq!(driver.total_devices(), 0);
}

#[test]
fn test_bind_records_matched_config() {
    common::init();
    let driver = PcdDriver::default();
    let id = driver
        .bind(&common::descriptor("pcdev-C1x", 128, AccessPolicy::ReadOnly))
        .unwrap();

    let info = driver.info(id).unwrap();
    assert_eq!(info.config.cfg_item1, 40);
    assert_eq!(info.config.cfg_item2, 23);
    assert_eq!(info.capacity, 128);
    assert_eq!(info.node_name, "pcdev-0");
}

#[test]
fn test_default_platform_devices_bind_in_order() {
    common::init();
    let driver = PcdDriver::default();
    let ids: Vec<_> = default_platform_devices()
        .iter()
        .map(|desc| driver.bind(desc).unwrap())
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);

    assert_eq!(driver.unbind_all(), 4);
    assert_eq!(driver.total_devices(), 0);
}

#[test]
fn test_unbind_leaves_no_reachable_instance() {
    common::init();
    let driver = PcdDriver::default();
    let id = driver
        .bind(&common::descriptor("pcdev-A1x", 4096, AccessPolicy::ReadWrite))
        .unwrap();
    let mut handle = driver.open(id, pcdev::AccessMode::Read).unwrap();

    driver.unbind(id).unwrap();
    assert!(driver.info(id).is_none());
    assert!(driver.registry().is_empty());
    assert!(driver.identities().is_empty());

    let mut buf = [0u8; 8];
    assert_eq!(
        driver.read(&mut handle, &mut buf, 8),
        Err(pcdev::AccessError::NoSuchDevice)
    );
}
