//! Application constants for the air-quality processor
//!
//! Column names of the monitoring exports, file naming conventions and the
//! default values used by configuration and the CLI.

// =============================================================================
// Source Table Layout
// =============================================================================

/// Station identifier column
pub const STATION_COLUMN: &str = "ESTACION";

/// Pollutant (magnitude) identifier column
pub const POLLUTANT_COLUMN: &str = "MAGNITUD";

/// Year column
pub const YEAR_COLUMN: &str = "ANO";

/// Month column
pub const MONTH_COLUMN: &str = "MES";

/// Identifier columns every source file must carry, in output order
pub const IDENTIFIER_COLUMNS: [&str; 4] = [STATION_COLUMN, POLLUTANT_COLUMN, YEAR_COLUMN, MONTH_COLUMN];

/// Day-slot column pattern: `D` followed by exactly two digits
pub const DAY_COLUMN_PATTERN: &str = r"^D(\d{2})$";

/// Field delimiter of the monitoring exports
pub const DEFAULT_DELIMITER: u8 = b';';

// =============================================================================
// File Naming
// =============================================================================

/// Prefix of source export files
pub const DEFAULT_FILE_PREFIX: &str = "emisiones-";

/// Extension of source export files
pub const DEFAULT_FILE_EXTENSION: &str = ".csv";

/// Filtered (wide) table export
pub const FILTERED_CSV_NAME: &str = "emisiones_filtrado.csv";

/// Valid long-format records export
pub const VALID_LONG_CSV_NAME: &str = "emisiones_long_validas.csv";

/// Per station/pollutant summary export
pub const SUMMARY_CSV_NAME: &str = "resumen_estacion_contaminante.csv";

/// Default workbook name, written next to the source files
pub const DEFAULT_WORKBOOK_NAME: &str = "resumen_emisiones.xlsx";

/// Workbook sheet names
pub mod sheets {
    pub const FILTERED: &str = "filtrado";
    pub const LONG: &str = "largo";
    pub const VALID: &str = "validas";
    pub const SUMMARY: &str = "resumen";
}

// =============================================================================
// Output Column Names
// =============================================================================

/// Raw day label column of long-format tables
pub const DAY_LABEL_COLUMN: &str = "DIA_STR";

/// Numeric day column of long-format tables
pub const DAY_COLUMN: &str = "DIA";

/// Measured value column of long-format tables
pub const VALUE_COLUMN: &str = "VALOR";

/// Calendar date column of long-format tables
pub const DATE_COLUMN: &str = "FECHA";

/// Summary statistic columns, after the two identifier columns
pub const SUMMARY_COLUMNS: [&str; 5] = ["count", "promedio", "desv_std", "min", "max"];

// =============================================================================
// Processing Defaults
// =============================================================================

/// Rows shown for each sample table on the console
pub const DEFAULT_SAMPLE_ROWS: usize = 15;

/// Row cap for the sample sheets of the workbook
pub const DEFAULT_WORKBOOK_SAMPLE_LIMIT: usize = 5000;

/// Upper bound on concurrently read source files
pub const MAX_CONCURRENT_FILES: usize = 8;

/// Months in a year, used as the x-axis domain of monthly charts
pub const MONTHS_PER_YEAR: u32 = 12;

/// Width in characters of the widest bar drawn by the terminal renderer
pub const CHART_BAR_WIDTH: usize = 40;
