//! Process configuration file format: wraps `aleph_types::NodeConfig` (the
//! committee/scheduler/network shape shared with the library crates) with
//! the key material needed to actually run as one of the committee's
//! processes, and loads the whole thing from a single TOML file.

use aleph_crypto::{BlsKeyPair, BlsPublicKey, Ed25519KeyPair, Ed25519PublicKey};
use aleph_types::{CommitteeInfo, ConfigError, NodeConfig};
use serde::Deserialize;
use std::path::Path;

/// This process's own key material, as stored on disk. Ed25519 seeds and
/// BLS secrets are both 32 raw bytes, hex-encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnKeys {
    pub ed25519_seed_hex: String,
    pub bls_secret_hex: String,
}

/// A committee member's public key material, as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitteeMemberKeys {
    pub ed25519_public_hex: String,
    pub bls_public_hex: String,
}

/// The on-disk process configuration: the committee/scheduler/network
/// config plus every key needed to sign units, cast coin shares, and
/// verify everyone else's.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessConfigFile {
    #[serde(flatten)]
    pub node: NodeConfig,
    pub own_keys: OwnKeys,
    pub committee_keys: Vec<CommitteeMemberKeys>,
}

impl ProcessConfigFile {
    /// Reads and parses a process configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.as_ref().display()))?;
        let file: ProcessConfigFile = toml::from_str(&text)
            .map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.as_ref().display()))?;
        Ok(file)
    }
}

/// Everything derived from a `ProcessConfigFile` once its hex-encoded keys
/// are decoded and validated: the typed config, this process's own signing
/// and coin keys, and the committee-wide public key tables the poset and
/// consensus services verify against.
pub struct Identity {
    pub config: NodeConfig,
    pub signing_key: Ed25519KeyPair,
    pub coin_key: BlsKeyPair,
    pub committee_info: CommitteeInfo,
    pub bls_public_keys: Vec<BlsPublicKey>,
}

impl ProcessConfigFile {
    /// Validates committee shape (§6 external interfaces) and decodes every
    /// key, producing a ready-to-run `Identity`.
    pub fn into_identity(self) -> Result<Identity, ConfigError> {
        let size = self.node.committee_size.0;
        let threshold = self.node.threshold;
        if threshold > size {
            return Err(ConfigError::ThresholdExceedsCommittee { size, threshold });
        }
        if size == 0 {
            return Err(ConfigError::DegenerateCommittee { size });
        }
        if self.node.own_id.0 >= size {
            return Err(ConfigError::OwnIdOutOfRange { own_id: self.node.own_id.0, size });
        }
        if self.committee_keys.len() != size as usize {
            return Err(ConfigError::MissingPublicKey(self.committee_keys.len() as u16));
        }

        let seed = decode_hex_32(&self.own_keys.ed25519_seed_hex)
            .map_err(|_| ConfigError::MissingPublicKey(self.node.own_id.0))?;
        let signing_key = Ed25519KeyPair::from_seed(seed);

        let bls_secret = decode_hex_32(&self.own_keys.bls_secret_hex)
            .map_err(|_| ConfigError::MissingPublicKey(self.node.own_id.0))?;
        let coin_key = BlsKeyPair::from_secret_bytes(&bls_secret)
            .map_err(|_| ConfigError::MissingPublicKey(self.node.own_id.0))?;

        let mut ed25519_public_keys = Vec::with_capacity(self.committee_keys.len());
        let mut bls_public_keys = Vec::with_capacity(self.committee_keys.len());
        for (idx, member) in self.committee_keys.iter().enumerate() {
            let ed_bytes = decode_hex_32(&member.ed25519_public_hex)
                .map_err(|_| ConfigError::MissingPublicKey(idx as u16))?;
            Ed25519PublicKey::from_bytes(ed_bytes)
                .map_err(|_| ConfigError::MissingPublicKey(idx as u16))?;
            ed25519_public_keys.push(ed_bytes);

            let bls_bytes = decode_hex_48(&member.bls_public_hex)
                .map_err(|_| ConfigError::MissingPublicKey(idx as u16))?;
            let bls_pk = BlsPublicKey::from_bytes(&bls_bytes)
                .map_err(|_| ConfigError::MissingPublicKey(idx as u16))?;
            bls_public_keys.push(bls_pk);
        }

        let committee_info = self.node.committee_info(ed25519_public_keys);

        Ok(Identity {
            config: self.node,
            signing_key,
            coin_key,
            committee_info,
            bls_public_keys,
        })
    }
}

fn decode_hex_32(s: &str) -> Result<[u8; 32], ()> {
    let bytes = hex::decode(s.trim()).map_err(|_| ())?;
    bytes.try_into().map_err(|_| ())
}

fn decode_hex_48(s: &str) -> Result<[u8; 48], ()> {
    let bytes = hex::decode(s.trim()).map_err(|_| ())?;
    bytes.try_into().map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml(own_id: u16, size: u16, threshold: u16) -> String {
        let own_seed = Ed25519KeyPair::generate();
        let own_bls = BlsKeyPair::generate();
        let mut keys_table = String::new();
        for _ in 0..size {
            let ed = Ed25519KeyPair::generate();
            let bls = BlsKeyPair::generate();
            keys_table.push_str(&format!(
                "[[committee_keys]]\ned25519_public_hex = \"{}\"\nbls_public_hex = \"{}\"\n",
                hex::encode(ed.public_key().as_bytes()),
                hex::encode(bls.public_key().to_bytes()),
            ));
        }
        format!(
            "own_id = {own_id}\ncommittee_size = {size}\nthreshold = {threshold}\n\n\
             [own_keys]\ned25519_seed_hex = \"{}\"\nbls_secret_hex = \"{}\"\n\n{keys_table}",
            hex::encode(own_seed.to_seed()),
            hex::encode(own_bls.secret_bytes()),
        )
    }

    #[test]
    fn well_formed_config_loads_into_an_identity() {
        let toml = sample_toml(0, 4, 3);
        let file: ProcessConfigFile = toml::from_str(&toml).unwrap();
        let identity = file.into_identity().unwrap();
        assert_eq!(identity.committee_info.size.0, 4);
        assert_eq!(identity.bls_public_keys.len(), 4);
    }

    #[test]
    fn own_id_out_of_range_is_rejected() {
        let toml = sample_toml(9, 4, 3);
        let file: ProcessConfigFile = toml::from_str(&toml).unwrap();
        let err = file.into_identity().unwrap_err();
        assert!(matches!(err, ConfigError::OwnIdOutOfRange { .. }));
    }

    #[test]
    fn threshold_above_committee_size_is_rejected() {
        let toml = sample_toml(0, 4, 5);
        let file: ProcessConfigFile = toml::from_str(&toml).unwrap();
        let err = file.into_identity().unwrap_err();
        assert!(matches!(err, ConfigError::ThresholdExceedsCommittee { .. }));
    }
}
