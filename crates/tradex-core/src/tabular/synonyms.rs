//! Header synonym table for fuzzy column matching (Spanish and English).
//!
//! This is data, not logic: add a synonym here and the mapper picks it up.
//! Bump [`SYNONYM_TABLE_VERSION`] whenever the table changes.

use std::fmt;

/// Version of the synonym table.
pub const SYNONYM_TABLE_VERSION: u32 = 1;

/// Canonical fields a spreadsheet column can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalField {
    Pair,
    TradeDate,
    Direction,
    RiskPercentage,
    RiskReward,
    Result,
    ResultAmount,
    Setup,
    Notes,
    EntryTime,
    ExitTime,
}

impl LogicalField {
    /// Every field, in the order columns are claimed.
    pub const ALL: [LogicalField; 11] = [
        LogicalField::Pair,
        LogicalField::TradeDate,
        LogicalField::Direction,
        LogicalField::RiskPercentage,
        LogicalField::RiskReward,
        LogicalField::Result,
        LogicalField::ResultAmount,
        LogicalField::Setup,
        LogicalField::Notes,
        LogicalField::EntryTime,
        LogicalField::ExitTime,
    ];

    /// Canonical snake_case field name.
    pub fn name(&self) -> &'static str {
        match self {
            LogicalField::Pair => "pair",
            LogicalField::TradeDate => "trade_date",
            LogicalField::Direction => "direction",
            LogicalField::RiskPercentage => "risk_percentage",
            LogicalField::RiskReward => "risk_reward",
            LogicalField::Result => "result",
            LogicalField::ResultAmount => "result_amount",
            LogicalField::Setup => "setup",
            LogicalField::Notes => "notes",
            LogicalField::EntryTime => "entry_time",
            LogicalField::ExitTime => "exit_time",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const PAIR: &[&str] = &[
    "pair", "par", "symbol", "activo", "instrumento", "instrument", "símbolo", "moneda", "currency",
];

const TRADE_DATE: &[&str] = &[
    "fecha", "date", "trade_date", "fecha_trade", "día", "day", "fecha operación",
];

const DIRECTION: &[&str] = &[
    "direction", "direccion", "dirección", "tipo", "tipo_operacion", "operación", "operation",
    "side", "posición",
];

const RISK_PERCENTAGE: &[&str] = &[
    "risk", "riesgo", "risk_percentage", "porcentaje_riesgo", "% riesgo", "risk %", "riesgo %",
];

const RISK_REWARD: &[&str] = &[
    "risk_reward", "rr", "r:r", "risk:reward", "risk/reward", "ratio", "risk reward",
];

const RESULT: &[&str] = &[
    "result", "resultado", "outcome", "ganancia", "pérdida", "perdida", "win", "loss", "gané",
    "perdí",
];

const RESULT_AMOUNT: &[&str] = &[
    "result_amount", "amount", "cantidad", "ganancia", "pérdida", "perdida", "profit", "loss",
    "resultado_cantidad", "monto", "pnl",
];

const SETUP: &[&str] = &[
    "setup", "configuracion", "configuración", "estrategia", "strategy", "tipo_setup",
    "setup_type", "tipo",
];

const NOTES: &[&str] = &[
    "notes", "nota", "notas", "comentario", "comentarios", "comment", "observaciones",
    "descripción", "descripcion",
];

const ENTRY_TIME: &[&str] = &[
    "entry_time", "hora_entrada", "entrada", "entry", "hora entrada", "time entry", "hora ent",
];

const EXIT_TIME: &[&str] = &[
    "exit_time", "hora_salida", "salida", "exit", "hora salida", "time exit", "hora sal",
];

/// Ordered, lower-case synonyms for a field.
pub fn synonyms(field: LogicalField) -> &'static [&'static str] {
    match field {
        LogicalField::Pair => PAIR,
        LogicalField::TradeDate => TRADE_DATE,
        LogicalField::Direction => DIRECTION,
        LogicalField::RiskPercentage => RISK_PERCENTAGE,
        LogicalField::RiskReward => RISK_REWARD,
        LogicalField::Result => RESULT,
        LogicalField::ResultAmount => RESULT_AMOUNT,
        LogicalField::Setup => SETUP,
        LogicalField::Notes => NOTES,
        LogicalField::EntryTime => ENTRY_TIME,
        LogicalField::ExitTime => EXIT_TIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_has_synonyms() {
        for field in LogicalField::ALL {
            assert!(!synonyms(field).is_empty(), "{} has no synonyms", field);
        }
    }

    #[test]
    fn test_synonyms_are_lower_case() {
        for field in LogicalField::ALL {
            for synonym in synonyms(field) {
                assert_eq!(*synonym, synonym.to_lowercase(), "{} in {}", synonym, field);
            }
        }
    }

    #[test]
    fn test_field_order_starts_with_identity() {
        assert_eq!(LogicalField::ALL[0], LogicalField::Pair);
        assert_eq!(LogicalField::ALL[1], LogicalField::TradeDate);
        assert_eq!(LogicalField::ALL[10].name(), "exit_time");
    }
}
