//! Lead derivation
//!
//! Six standard limb leads from the three filtered electrode potentials.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a derived lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadName {
    /// Lead I (LA - RA)
    I,
    /// Lead II (LL - RA)
    II,
    /// Lead III (LL - LA)
    III,
    /// Augmented vector right
    AVR,
    /// Augmented vector left
    AVL,
    /// Augmented vector foot
    AVF,
}

impl LeadName {
    /// All leads in wire order.
    pub const ALL: [LeadName; 6] = [
        LeadName::I,
        LeadName::II,
        LeadName::III,
        LeadName::AVR,
        LeadName::AVL,
        LeadName::AVF,
    ];

    /// Key used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            LeadName::I => "I",
            LeadName::II => "II",
            LeadName::III => "III",
            LeadName::AVR => "aVR",
            LeadName::AVL => "aVL",
            LeadName::AVF => "aVF",
        }
    }
}

impl fmt::Display for LeadName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six limb leads for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DerivedLeads {
    /// Lead I
    #[serde(rename = "I")]
    pub i: f64,
    /// Lead II
    #[serde(rename = "II")]
    pub ii: f64,
    /// Lead III
    #[serde(rename = "III")]
    pub iii: f64,
    /// aVR
    #[serde(rename = "aVR")]
    pub avr: f64,
    /// aVL
    #[serde(rename = "aVL")]
    pub avl: f64,
    /// aVF
    #[serde(rename = "aVF")]
    pub avf: f64,
}

impl DerivedLeads {
    /// Value of a single lead.
    pub fn get(&self, lead: LeadName) -> f64 {
        match lead {
            LeadName::I => self.i,
            LeadName::II => self.ii,
            LeadName::III => self.iii,
            LeadName::AVR => self.avr,
            LeadName::AVL => self.avl,
            LeadName::AVF => self.avf,
        }
    }

    /// `(name, value)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (LeadName, f64)> + '_ {
        LeadName::ALL.into_iter().map(|lead| (lead, self.get(lead)))
    }
}

/// Derive the six limb leads from `[RA, LA, LL]`.
pub fn derive_leads(electrodes: [f64; 3]) -> DerivedLeads {
    let [ra, la, ll] = electrodes;
    DerivedLeads {
        i: la - ra,
        ii: ll - ra,
        iii: ll - la,
        avr: ra - (la + ll) / 2.0,
        avl: la - (ra + ll) / 2.0,
        avf: ll - (ra + la) / 2.0,
    }
}
