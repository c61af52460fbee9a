// Workbook fixtures shaped like the HuellaChile calculator, written with
// rust_xlsxwriter so tests go through the real xlsx reader.
#![allow(dead_code)]

use rust_xlsxwriter::{Format, Workbook};

#[derive(Clone, Debug)]
pub enum Value {
    Text(String),
    Number(f64),
    /// Excel serial number shown with a date format
    Date(f64),
    Blank,
}

pub fn t(text: &str) -> Value {
    Value::Text(text.to_string())
}

pub fn n(number: f64) -> Value {
    Value::Number(number)
}

pub const DETAIL_HEADERS: [&str; 10] = [
    "Alcance",
    "Categoría",
    "Fuente de Emisión",
    "Dato de Actividad\n(DA)",
    "Unidad DA",
    "Emision CO2 \n[kg]",
    "Emisión CH4 \n[kg]",
    "Emisión N2O \n[kg]",
    "Emisión CO2e\n[t]",
    "% del total",
];

#[derive(Clone, Debug)]
pub struct Fixture {
    pub summary_sheet: Option<String>,
    pub metadata_sheet: Option<String>,
    pub detail_sheet: Option<String>,
    pub summary: Vec<Vec<Value>>,
    pub metadata: Vec<(String, Value)>,
    pub detail_headers: Vec<String>,
    pub detail: Vec<Vec<Value>>,
}

impl Fixture {
    /// A complete inventory for `year`: 500 tCO2e declared in a total row,
    /// 50 workers, 1000 m², six detail rows (one without a numeric emission).
    pub fn standard(year: i32) -> Self {
        Fixture {
            summary_sheet: Some("Resumen Cálculo".to_string()),
            metadata_sheet: Some("Alcances".to_string()),
            detail_sheet: Some("Resumen Emisiones".to_string()),
            summary: vec![
                vec![t("Alcance 1"), n(100.0), n(0.2)],
                vec![t("Alcance 2"), n(150.0), n(0.3)],
                vec![t("Alcance 3"), n(250.0), n(0.5)],
                vec![t("Total"), n(500.0), n(1.0)],
            ],
            metadata: vec![
                ("Razón social".to_string(), t("CDPR Bío-Bío")),
                ("Año inventario".to_string(), n(year as f64)),
                ("Número de trabajadores".to_string(), n(50.0)),
                ("Superficie (m2)".to_string(), n(1000.0)),
            ],
            detail_headers: DETAIL_HEADERS.iter().map(|h| h.to_string()).collect(),
            detail: vec![
                detail_row("Alcance 1", "1.1 - Combustión estacionaria", "Gas natural", n(5000.0), "m3", [n(9000.0), n(20.0), n(10.0)], n(9.03)),
                detail_row("Alcance 1", "1.2 - Combustión móvil", "Diésel", n(30000.0), "L", [n(80000.0), n(100.0), n(900.0)], n(81.0)),
                detail_row("Alcance 2", "2.1 - Compra de energía", "Electricidad", n(400000.0), "kWh", [Value::Blank, Value::Blank, Value::Blank], n(150.0)),
                detail_row("Alcance 3", "3.07 - Traslado de colaboradores", "Bus", n(120000.0), "km", [Value::Blank, Value::Blank, Value::Blank], n(120.0)),
                detail_row("Alcance 3", "3.07 - Traslado de colaboradores", "Automóvil", n(60000.0), "km", [Value::Blank, Value::Blank, Value::Blank], n(80.0)),
                vec![Value::Blank; 10],
                detail_row("Alcance 3", "3.01 - Bienes y servicios", "Papel", t("s/i"), "kg", [Value::Blank, Value::Blank, Value::Blank], t("s/i")),
            ],
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut workbook = Workbook::new();

        if let Some(name) = &self.summary_sheet {
            let sheet = workbook.add_worksheet();
            sheet.set_name(name).unwrap();
            sheet.write_string(0, 0, "Resumen de cálculo").unwrap();
            sheet.write_string(2, 0, "Alcance / Categoría").unwrap();
            sheet.write_string(2, 1, "Emisión tCO2e").unwrap();
            sheet.write_string(2, 2, "% del total").unwrap();
            for (r, row) in self.summary.iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    write_value(sheet, 3 + r as u32, c as u16, value);
                }
            }
        }

        if let Some(name) = &self.metadata_sheet {
            let sheet = workbook.add_worksheet();
            sheet.set_name(name).unwrap();
            sheet.write_string(0, 0, "Dato").unwrap();
            sheet.write_string(0, 1, "Valor").unwrap();
            for (r, (label, value)) in self.metadata.iter().enumerate() {
                sheet.write_string(1 + r as u32, 0, label.as_str()).unwrap();
                write_value(sheet, 1 + r as u32, 1, value);
            }
        }

        if let Some(name) = &self.detail_sheet {
            let sheet = workbook.add_worksheet();
            sheet.set_name(name).unwrap();
            sheet.write_string(0, 0, "Resumen de emisiones por fuente").unwrap();
            for (c, header) in self.detail_headers.iter().enumerate() {
                sheet.write_string(1, c as u16, header.as_str()).unwrap();
            }
            for (r, row) in self.detail.iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    write_value(sheet, 2 + r as u32, c as u16, value);
                }
            }
        }

        workbook.save_to_buffer().unwrap()
    }
}

pub fn detail_row(
    scope: &str,
    category: &str,
    source: &str,
    activity: Value,
    unit: &str,
    gases_kg: [Value; 3],
    emissions: Value,
) -> Vec<Value> {
    let [co2, ch4, n2o] = gases_kg;
    vec![t(scope), t(category), t(source), activity, t(unit), co2, ch4, n2o, emissions, Value::Blank]
}

fn write_value(sheet: &mut rust_xlsxwriter::Worksheet, row: u32, col: u16, value: &Value) {
    match value {
        Value::Text(text) => {
            sheet.write_string(row, col, text.as_str()).unwrap();
        }
        Value::Number(number) => {
            sheet.write_number(row, col, *number).unwrap();
        }
        Value::Date(serial) => {
            let format = Format::new().set_num_format("yyyy-mm-dd");
            sheet.write_number_with_format(row, col, *serial, &format).unwrap();
        }
        Value::Blank => {}
    }
}
