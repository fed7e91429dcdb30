//! Property-based tests for statprobe.
//!
//! Uses proptest to generate random inputs and verify invariants hold.
//! Decoding and identification must never panic on arbitrary bytes.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use proptest::prelude::*;
use statprobe::decode::{decode_status, NativeStat};
use statprobe::error::Error;
use statprobe::identity::{parse_uname, Architecture, OsKind, RuntimeIdentity, MIN_UNAME_BUFFER_LEN};
use statprobe::layout::{layout_for, MAX_LAYOUT_SIZE};
use statprobe::status::{FileMode, FileType};

fn identity_strategy() -> impl Strategy<Value = RuntimeIdentity> {
    (
        prop_oneof![Just(OsKind::Linux), Just(OsKind::MacOs)],
        prop_oneof![Just(Architecture::Amd64), Just(Architecture::Arm64)],
    )
        .prop_map(|(os, arch)| RuntimeIdentity::new(os, arch))
}

fn uname_bytes(sysname: &str, machine: &str, field_len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; MIN_UNAME_BUFFER_LEN];
    buf[..sysname.len()].copy_from_slice(sysname.as_bytes());
    let at = 4 * field_len;
    buf[at..at + machine.len()].copy_from_slice(machine.as_bytes());
    buf
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Property: parsing never panics, whatever the kernel wrote
    #[test]
    fn prop_parse_uname_total(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let _ = parse_uname(&bytes);
    }

    // Property: any sysname other than Linux or Darwin is unsupported
    #[test]
    fn prop_unknown_sysname_unsupported(sysname in "[A-Za-z0-9]{1,32}") {
        prop_assume!(sysname != "Linux" && sysname != "Darwin");
        let err = parse_uname(&uname_bytes(&sysname, "x86_64", 65)).unwrap_err();
        prop_assert!(err.is_platform_unsupported());
    }

    // Property: any machine outside the recognized spellings is unsupported
    #[test]
    fn prop_unknown_machine_unsupported(machine in "[a-z0-9_]{1,32}") {
        prop_assume!(!["x86_64", "aarch64", "arm64"].contains(&machine.as_str()));
        let linux = parse_uname(&uname_bytes("Linux", &machine, 65));
        let darwin = parse_uname(&uname_bytes("Darwin", &machine, 256));
        prop_assert!(linux.unwrap_err().is_platform_unsupported());
        prop_assert!(darwin.unwrap_err().is_platform_unsupported());
    }

    // Property: a full-size buffer always decodes, for every layout
    #[test]
    fn prop_decode_full_buffer_succeeds(
        identity in identity_strategy(),
        bytes in proptest::collection::vec(any::<u8>(), MAX_LAYOUT_SIZE),
    ) {
        let status = decode_status(identity, &bytes);
        prop_assert!(status.is_ok());
    }

    // Property: a buffer shorter than the layout is rejected, never read past
    #[test]
    fn prop_decode_short_buffer_rejected(identity in identity_strategy(), cut in 1usize..64) {
        let size = layout_for(identity.os, identity.arch).size;
        let bytes = vec![0u8; size - cut];
        let err = decode_status(identity, &bytes).unwrap_err();
        let is_invalid = matches!(err, Error::InvalidInput { .. });
        prop_assert!(is_invalid);
    }

    // Property: the decoded variant always matches the identity's layout
    #[test]
    fn prop_decoded_layout_matches_identity(identity in identity_strategy()) {
        let native = NativeStat::decode(identity, &[0u8; MAX_LAYOUT_SIZE]).unwrap();
        prop_assert_eq!(native.layout().name, layout_for(identity.os, identity.arch).name);
    }

    // Property: the macOS device id is sign-extended from 32 bits
    #[test]
    fn prop_darwin_dev_sign_extended(dev in any::<i32>(), arch in prop_oneof![Just(Architecture::Amd64), Just(Architecture::Arm64)]) {
        let layout = layout_for(OsKind::MacOs, arch);
        let mut bytes = vec![0u8; layout.size];
        bytes[layout.dev.offset..layout.dev.end()].copy_from_slice(&dev.to_ne_bytes());

        let status = decode_status(RuntimeIdentity::new(OsKind::MacOs, arch), &bytes).unwrap();
        prop_assert_eq!(status.dev, i64::from(dev) as u64);
    }

    // Property: the macOS 16-bit mode is zero-extended
    #[test]
    fn prop_darwin_mode_zero_extended(mode in any::<u16>()) {
        let layout = layout_for(OsKind::MacOs, Architecture::Arm64);
        let mut bytes = vec![0u8; layout.size];
        bytes[layout.mode.offset..layout.mode.end()].copy_from_slice(&mode.to_ne_bytes());

        let status = decode_status(RuntimeIdentity::new(OsKind::MacOs, Architecture::Arm64), &bytes).unwrap();
        prop_assert_eq!(status.mode, u32::from(mode));
    }

    // Property: permissions are exactly the low twelve bits of the mode
    #[test]
    fn prop_permissions_are_low_bits(mode in any::<u32>()) {
        prop_assert_eq!(FileMode::from_mode(mode).bits(), mode & 0o7777);
    }

    // Property: the file type ignores permission bits
    #[test]
    fn prop_file_type_ignores_permissions(kind in 0u32..16, perms in 0u32..0o7777) {
        let mode = kind << 12;
        prop_assert_eq!(FileType::from_mode(mode), FileType::from_mode(mode | perms));
    }

    // Property: Error::is_not_found only for ENOENT
    #[test]
    fn prop_is_not_found_only_for_enoent(code in any::<i32>()) {
        let err = Error::io(code, "/tmp/x");
        prop_assert_eq!(err.is_not_found(), code == 2);
        prop_assert_eq!(err.error_code(), Some(code));
    }

    // Property: identification failures carry their code
    #[test]
    fn prop_identification_failed_code(code in any::<i32>()) {
        let err = Error::identification_failed(code);
        prop_assert_eq!(err.error_code(), Some(code));
        prop_assert!(!err.is_platform_unsupported());
    }
}

#[test]
fn test_regular_and_directory_types() {
    assert_eq!(FileType::from_mode(0o100_644), FileType::Regular);
    assert_eq!(FileType::from_mode(0o040_755), FileType::Directory);
    assert_eq!(FileType::from_mode(0o120_777), FileType::Symlink);
}
