//! Baryonic-mass attachment: inner join of the BTFR table with the galaxy
//! mass table on `name`.
//!
//! The join overwrites the assembler's NaN placeholder with the freshly
//! computed `M_b = Mstar + 1.33 * Mgas`. Galaxies present in only one of the
//! two tables are dropped; the caller reports the joined/input counts.

use std::collections::HashMap;

use crate::domain::{BtfrMassRecord, BtfrRecord, MassRecord};

/// Inner-join BTFR records with mass records on `name`, in BTFR row order.
pub fn attach_baryonic_mass(
    btfr: &[BtfrRecord],
    masses: &[MassRecord],
    gas_helium_factor: f64,
) -> Vec<BtfrMassRecord> {
    let mass_by_name: HashMap<&str, &MassRecord> =
        masses.iter().map(|m| (m.name.as_str(), m)).collect();

    btfr.iter()
        .filter_map(|record| {
            let mass = mass_by_name.get(record.name.as_str())?;
            Some(BtfrMassRecord {
                name: record.name.clone(),
                v_flat: record.v_flat,
                m_b: mass.baryonic_mass(gas_helium_factor),
            })
        })
        .collect()
}
