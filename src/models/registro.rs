//! Modelo de Registro (detalle de visita de un vendedor)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registro {
    pub id: String,
    /// `YYYY-MM-DD`
    pub fecha: String,
    /// `HH:mm`
    pub hora_ingreso: String,
    #[serde(default)]
    pub hora_salida: Option<String>,
    pub vendedor: String,
    pub ubicacion: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub nro_pedido: Option<String>,
    #[serde(default)]
    pub nro_cobro: Option<String>,
    #[serde(default)]
    pub cliente: Option<String>,
    #[serde(default)]
    pub pedido: bool,
    #[serde(default)]
    pub cobro: bool,
    #[serde(default)]
    pub monto: Option<f64>,
}

impl Registro {
    /// Color del marcador según lo que se hizo en la visita
    pub fn color(&self) -> &'static str {
        match (self.pedido, self.cobro) {
            (true, true) => "#f59e0b",
            (true, false) => "#10b981",
            (false, true) => "#ef4444",
            (false, false) => "#3b82f6",
        }
    }

    pub fn inicial(&self) -> String {
        self.vendedor.chars().next().map(String::from).unwrap_or_default()
    }
}

#[allow(clippy::too_many_arguments)]
fn registro(
    id: &str,
    fecha: &str,
    ingreso: &str,
    salida: &str,
    vendedor: &str,
    ubicacion: &str,
    (lat, lng): (f64, f64),
    nro_pedido: Option<&str>,
    nro_cobro: Option<&str>,
    cliente: &str,
    monto: f64,
) -> Registro {
    Registro {
        id: id.to_string(),
        fecha: fecha.to_string(),
        hora_ingreso: ingreso.to_string(),
        hora_salida: Some(salida.to_string()),
        vendedor: vendedor.to_string(),
        ubicacion: ubicacion.to_string(),
        lat,
        lng,
        pedido: nro_pedido.is_some(),
        cobro: nro_cobro.is_some(),
        nro_pedido: nro_pedido.map(str::to_string),
        nro_cobro: nro_cobro.map(str::to_string),
        cliente: Some(cliente.to_string()),
        monto: Some(monto),
    }
}

/// Registros de ejemplo que se persisten la primera vez
pub fn registros_semilla() -> Vec<Registro> {
    vec![
        registro(
            "R-1001", "2025-07-17", "08:30", "08:55", "PLATAZO LUIS",
            "Av. Amazonas y Quito, Centro, Quito", (-0.186879, -78.503194),
            Some("P-2001"), None, "Sebastián Moreno", 120.0,
        ),
        registro(
            "R-1002", "2025-07-17", "09:00", "09:15", "PLATAZO LUIS",
            "Calle 10, Norte", (-0.1732, -78.4891),
            None, Some("C-3001"), "María Guerrero", 50.0,
        ),
        registro(
            "R-1003", "2025-07-18", "10:10", "10:40", "JUAN CARLOS",
            "Sector Industrial Norte", (-0.1567, -78.5488),
            Some("P-2002"), Some("C-3002"), "Empresa ABC", 300.0,
        ),
        registro(
            "R-1004", "2025-07-18", "11:30", "11:45", "MARIA PACHECO",
            "Plaza Centro", (-0.18, -78.5),
            Some("P-2003"), None, "J. Ramirez", 80.0,
        ),
        registro(
            "R-1005", "2025-07-19", "12:05", "12:20", "CARLOS ORTEGA",
            "Av. 10 de Agosto", (-0.17, -78.495),
            None, Some("C-3003"), "Ana López", 40.0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_por_actividad() {
        let semilla = registros_semilla();
        assert_eq!(semilla[0].color(), "#10b981");
        assert_eq!(semilla[1].color(), "#ef4444");
        assert_eq!(semilla[2].color(), "#f59e0b");
        assert_eq!(semilla[0].inicial(), "P");
    }

    #[test]
    fn test_deserializa_nulos() {
        let json = r#"{"id":"R-1","fecha":"2025-07-17","horaIngreso":"08:30","vendedor":"X",
            "ubicacion":"Y","lat":0.0,"lng":0.0,"nroPedido":null,"nroCobro":"C-1","cobro":true}"#;
        let r: Registro = serde_json::from_str(json).unwrap();
        assert_eq!(r.nro_pedido, None);
        assert!(r.cobro);
        assert!(!r.pedido);
        assert_eq!(r.color(), "#ef4444");
    }
}
