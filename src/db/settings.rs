use rusqlite::params;

use crate::db::Database;
use crate::error::JournalError;
use crate::models::{RiskSettings, RiskSettingsUpdate, RoiSnapshot};

impl Database {
    pub fn get_settings(&self) -> Result<RiskSettings, JournalError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| JournalError::Database(e.to_string()))?;
        let settings = conn.query_row(
            "SELECT capital, risk_percent, diversification FROM risk_settings WHERE id = 1",
            [],
            |row| {
                Ok(RiskSettings {
                    capital: row.get(0)?,
                    risk_percent: row.get(1)?,
                    diversification: row.get(2)?,
                })
            },
        )?;
        Ok(settings)
    }

    /// Apply a partial settings update and return the fresh settings.
    pub fn update_settings(
        &self,
        update: &RiskSettingsUpdate,
    ) -> Result<RiskSettings, JournalError> {
        {
            let conn = self
                .conn
                .lock()
                .map_err(|e| JournalError::Database(e.to_string()))?;

            // Build dynamic UPDATE query
            let mut updates = Vec::new();
            let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(val) = update.capital {
                updates.push("capital = ?");
                values.push(Box::new(val));
            }
            if let Some(val) = update.risk_percent {
                updates.push("risk_percent = ?");
                values.push(Box::new(val));
            }
            if let Some(val) = update.diversification {
                updates.push("diversification = ?");
                values.push(Box::new(val));
            }

            updates.push("updated_at = strftime('%s', 'now')");

            let query = format!("UPDATE risk_settings SET {} WHERE id = 1", updates.join(", "));
            let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();

            conn.execute(&query, params.as_slice())?;
        }

        self.get_settings()
    }

    /// Persist the full settings-form snapshot (base settings, derived
    /// budgets, and the KPI values captured at save time).
    pub fn save_roi_snapshot(&self, snapshot: &RoiSnapshot) -> Result<(), JournalError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| JournalError::Database(e.to_string()))?;
        conn.execute(
            "UPDATE risk_settings SET
                capital = ?, risk_percent = ?, diversification = ?,
                total_risk = ?, ipt = ?, rpt = ?, invested = ?,
                monthly_pl = ?, tax_pl = ?, donation_pl = ?, monthly_gain = ?,
                monthly_percent_gain = ?, total_gain = ?, total_percent_gain = ?,
                updated_at = strftime('%s', 'now')
             WHERE id = 1",
            params![
                snapshot.total_capital,
                snapshot.risk,
                snapshot.diversification,
                snapshot.total_risk,
                snapshot.ipt,
                snapshot.rpt,
                snapshot.invested,
                snapshot.monthly_pl,
                snapshot.tax_pl,
                snapshot.donation_pl,
                snapshot.monthly_gain,
                snapshot.monthly_percent_gain,
                snapshot.total_gain,
                snapshot.total_percent_gain,
            ],
        )?;
        Ok(())
    }

    pub fn get_roi_snapshot(&self) -> Result<RoiSnapshot, JournalError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| JournalError::Database(e.to_string()))?;
        let snapshot = conn.query_row(
            "SELECT capital, risk_percent, diversification, total_risk, ipt, rpt,
                    invested, monthly_pl, tax_pl, donation_pl, monthly_gain,
                    monthly_percent_gain, total_gain, total_percent_gain
             FROM risk_settings WHERE id = 1",
            [],
            |row| {
                Ok(RoiSnapshot {
                    total_capital: row.get(0)?,
                    risk: row.get(1)?,
                    diversification: row.get(2)?,
                    total_risk: row.get(3)?,
                    ipt: row.get(4)?,
                    rpt: row.get(5)?,
                    invested: row.get(6)?,
                    monthly_pl: row.get(7)?,
                    tax_pl: row.get(8)?,
                    donation_pl: row.get(9)?,
                    monthly_gain: row.get(10)?,
                    monthly_percent_gain: row.get(11)?,
                    total_gain: row.get(12)?,
                    total_percent_gain: row.get(13)?,
                })
            },
        )?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregate::PortfolioSummary;

    #[test]
    fn test_defaults_are_zero() {
        let db = Database::open_in_memory().unwrap();
        let settings = db.get_settings().unwrap();
        assert_eq!(settings, RiskSettings::default());
    }

    #[test]
    fn test_partial_update() {
        let db = Database::open_in_memory().unwrap();
        let updated = db
            .update_settings(&RiskSettingsUpdate {
                capital: Some(100_000.0),
                risk_percent: Some(1.0),
                diversification: None,
            })
            .unwrap();
        assert_eq!(updated.capital, 100_000.0);
        assert_eq!(updated.risk_percent, 1.0);
        assert_eq!(updated.diversification, 0);

        let updated = db
            .update_settings(&RiskSettingsUpdate {
                diversification: Some(20),
                ..Default::default()
            })
            .unwrap();
        // Earlier values survive a later partial update.
        assert_eq!(updated.capital, 100_000.0);
        assert_eq!(updated.diversification, 20);
    }

    #[test]
    fn test_roi_snapshot_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let settings = RiskSettings::new(100_000.0, 1.0, 20);
        let summary = PortfolioSummary {
            invested_sum: 5000.0,
            monthly_pl_total: 450.0,
            tax_pl: 90.0,
            donation: 18.0,
            monthly_gain: 342.0,
            monthly_gain_percent: 0.342,
            booked_positive: 450.0,
            booked_negative: 0.0,
        };
        let snapshot = RoiSnapshot::build(&settings, &summary);
        db.save_roi_snapshot(&snapshot).unwrap();

        let fetched = db.get_roi_snapshot().unwrap();
        assert_eq!(fetched, snapshot);
        // Base settings updated along with the snapshot.
        assert_eq!(db.get_settings().unwrap(), settings);
        // Percent rounded to two decimals on the way in.
        assert_eq!(fetched.monthly_percent_gain, 0.34);
    }
}
