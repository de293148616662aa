//! Well-known sysvar account ids.

use sol_core::Pubkey;

/// `SysvarC1ock11111111111111111111111111111111`
pub const CLOCK: Pubkey = Pubkey::new_from_array([
    0x06, 0xa7, 0xd5, 0x17, 0x18, 0xc7, 0x74, 0xc9, 0x28, 0x56, 0x63, 0x98, 0x69, 0x1d, 0x5e, 0xb6,
    0x8b, 0x5e, 0xb8, 0xa3, 0x9b, 0x4b, 0x6d, 0x5c, 0x73, 0x55, 0x5b, 0x21, 0x00, 0x00, 0x00, 0x00,
]);

/// `SysvarRent111111111111111111111111111111111`
pub const RENT: Pubkey = Pubkey::new_from_array([
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x2c, 0x5c, 0x51, 0x21, 0x8c, 0xc9, 0x4c, 0x3d, 0x4a, 0xf1, 0x7f,
    0x58, 0xda, 0xee, 0x08, 0x9b, 0xa1, 0xfd, 0x44, 0xe3, 0xdb, 0xd9, 0x8a, 0x00, 0x00, 0x00, 0x00,
]);

/// `SysvarRecentB1ockHashes11111111111111111111`
pub const RECENT_BLOCKHASHES: Pubkey = Pubkey::new_from_array([
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x2c, 0x56, 0x8e, 0xe0, 0x8a, 0x84, 0x5f, 0x73, 0xd2, 0x97, 0x88,
    0xcf, 0x03, 0x5c, 0x31, 0x45, 0xb2, 0x1a, 0xb3, 0x44, 0xd8, 0x06, 0x2e, 0xa9, 0x40, 0x00, 0x00,
]);

/// `Sysvar1nstructions1111111111111111111111111`
pub const INSTRUCTIONS: Pubkey = Pubkey::new_from_array([
    0x06, 0xa7, 0xd5, 0x17, 0x18, 0x7b, 0xd1, 0x66, 0x35, 0xda, 0xd4, 0x04, 0x55, 0xfd, 0xc2, 0xc0,
    0xc1, 0x24, 0xc6, 0x8f, 0x21, 0x56, 0x75, 0xa5, 0xdb, 0xba, 0xcb, 0x5f, 0x08, 0x00, 0x00, 0x00,
]);

/// `SysvarStakeHistory1111111111111111111111111`
pub const STAKE_HISTORY: Pubkey = Pubkey::new_from_array([
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x35, 0x84, 0xd0, 0xfe, 0xed, 0x9b, 0xb3, 0x43, 0x1d, 0x13, 0x20,
    0x6b, 0xe5, 0x44, 0x28, 0x1b, 0x57, 0xb8, 0x56, 0x6c, 0xc5, 0x37, 0x5f, 0xf4, 0x00, 0x00, 0x00,
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sysvar_ids_match_base58() {
        assert_eq!(CLOCK.to_string(), "SysvarC1ock11111111111111111111111111111111");
        assert_eq!(RENT.to_string(), "SysvarRent111111111111111111111111111111111");
        assert_eq!(
            RECENT_BLOCKHASHES.to_string(),
            "SysvarRecentB1ockHashes11111111111111111111"
        );
        assert_eq!(INSTRUCTIONS.to_string(), "Sysvar1nstructions1111111111111111111111111");
        assert_eq!(STAKE_HISTORY.to_string(), "SysvarStakeHistory1111111111111111111111111");
    }
}
