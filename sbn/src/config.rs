//! Peer and module configuration file loading.
//!
//! Both on-disk formats are line-oriented text, matching the original
//! `cfe_es_conf`-style loader: comments start with `#`, blank lines are
//! skipped, fields are comma-separated. No schema-driven serialization
//! crate is introduced here — parsing follows the same `FromStr` idiom
//! used for the wire types, just one line at a time.

use std::fmt;
use std::str::FromStr;

use sbn_core::identity::CpuId;

/// One record of the peer configuration file: `NetID, CpuID, Name,
/// transport-specific-address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    pub net_id: String,
    pub cpu_id: CpuId,
    pub name: String,
    pub address: String,
}

impl FromStr for PeerRecord {
    type Err = ConfigError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [net_id, cpu_id, name, address] = fields.as_slice() else {
            return Err(ConfigError::MalformedLine(line.to_string()));
        };
        let cpu_id: u32 = cpu_id
            .parse()
            .map_err(|_| ConfigError::MalformedLine(line.to_string()))?;
        Ok(Self {
            net_id: (*net_id).to_string(),
            cpu_id: CpuId::new(cpu_id),
            name: (*name).to_string(),
            address: (*address).to_string(),
        })
    }
}

/// One record of the module configuration file: the transport module's
/// name and its per-net options string, verbatim (the transport itself
/// is responsible for parsing its own options).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub net_id: String,
    pub transport_name: String,
    pub options: String,
}

impl FromStr for ModuleRecord {
    type Err = ConfigError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.splitn(3, ',').map(str::trim);
        let net_id = fields.next().ok_or_else(|| ConfigError::MalformedLine(line.to_string()))?;
        let transport_name = fields
            .next()
            .ok_or_else(|| ConfigError::MalformedLine(line.to_string()))?;
        let options = fields.next().unwrap_or_default();
        Ok(Self {
            net_id: net_id.to_string(),
            transport_name: transport_name.to_string(),
            options: options.to_string(),
        })
    }
}

/// Parse every non-comment, non-blank line of `text` as a `T`.
pub fn parse_records<T: FromStr<Err = ConfigError>>(text: &str) -> Result<Vec<T>, ConfigError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(T::from_str)
        .collect()
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed configuration line: {0}")]
    MalformedLine(String),

    #[error("configuration file not found: {0}")]
    NotFound(String),
}

impl fmt::Display for PeerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.net_id, self.cpu_id, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_peer_record() {
        let record: PeerRecord = "udp0, 2, Bravo, 192.168.1.2:4000".parse().unwrap();
        assert_eq!(record.net_id, "udp0");
        assert_eq!(record.cpu_id, CpuId::new(2));
        assert_eq!(record.name, "Bravo");
        assert_eq!(record.address, "192.168.1.2:4000");
    }

    #[test]
    fn rejects_a_record_with_too_few_fields() {
        assert!(matches!(
            "udp0, 2".parse::<PeerRecord>(),
            Err(ConfigError::MalformedLine(_))
        ));
    }

    #[test]
    fn parse_records_skips_comments_and_blank_lines() {
        let text = "# peer config\n\nudp0, 1, Alpha, 10.0.0.1:4000\nudp0, 2, Bravo, 10.0.0.2:4000\n";
        let records: Vec<PeerRecord> = parse_records(text).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn module_record_keeps_options_verbatim() {
        let record: ModuleRecord = "udp0, udp, bind=0.0.0.0:4000".parse().unwrap();
        assert_eq!(record.transport_name, "udp");
        assert_eq!(record.options, "bind=0.0.0.0:4000");
    }
}
