//! Exportación de datos (CSV de registros, JSON de geocercas)

use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;

use crate::models::geocerca::Geocerca;
use crate::models::registro::Registro;
use crate::utils::errors::{AppError, AppResult};

pub const MSG_SIN_REGISTROS: &str = "No hay registros para exportar";

const ENCABEZADOS_CSV: [&str; 12] = [
    "id",
    "fecha",
    "hora_ingreso",
    "hora_salida",
    "nombre_vendedor",
    "ubicacion",
    "nro_pedido",
    "nro_cobro",
    "nombre_cliente",
    "pedido",
    "cobro",
    "monto",
];

/// Archivo listo para descargar
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivoExportado {
    pub nombre: String,
    pub tipo_contenido: &'static str,
    pub contenido: String,
}

/// Descarga como adjunto
impl IntoResponse for ArchivoExportado {
    fn into_response(self) -> Response {
        let disposicion = format!("attachment; filename=\"{}\"", self.nombre);
        (
            [
                (header::CONTENT_TYPE, self.tipo_contenido.to_string()),
                (header::CONTENT_DISPOSITION, disposicion),
            ],
            self.contenido,
        )
            .into_response()
    }
}

fn celda_csv(valor: &str) -> String {
    if valor.contains(',') || valor.contains('"') || valor.contains('\n') {
        format!("\"{}\"", valor.replace('"', "\"\""))
    } else {
        valor.to_string()
    }
}

fn linea_csv<S: AsRef<str>>(valores: &[S]) -> String {
    valores
        .iter()
        .map(|v| celda_csv(v.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

fn marca(valor: bool) -> String {
    if valor { "X".to_string() } else { String::new() }
}

/// CSV de los registros filtrados, líneas separadas por CRLF
pub fn registros_csv(registros: &[Registro], fecha: NaiveDate) -> AppResult<ArchivoExportado> {
    if registros.is_empty() {
        return Err(AppError::Validation(MSG_SIN_REGISTROS.to_string()));
    }

    let mut lineas = vec![linea_csv(&ENCABEZADOS_CSV)];
    lineas.extend(registros.iter().map(|r| {
        linea_csv(&[
            r.id.clone(),
            r.fecha.clone(),
            r.hora_ingreso.clone(),
            r.hora_salida.clone().unwrap_or_default(),
            r.vendedor.clone(),
            r.ubicacion.clone(),
            r.nro_pedido.clone().unwrap_or_default(),
            r.nro_cobro.clone().unwrap_or_default(),
            r.cliente.clone().unwrap_or_default(),
            marca(r.pedido),
            marca(r.cobro),
            r.monto.map(|m| m.to_string()).unwrap_or_default(),
        ])
    }));

    tracing::info!("📤 Exportando {} registros a CSV", registros.len());
    Ok(ArchivoExportado {
        nombre: format!("detalle_registros_{}.csv", fecha.format("%Y-%m-%d")),
        tipo_contenido: "text/csv;charset=utf-8",
        contenido: lineas.join("\r\n"),
    })
}

/// Colección completa de geocercas en JSON con sangría
pub fn geocercas_json(geocercas: &[Geocerca], fecha: NaiveDate) -> AppResult<ArchivoExportado> {
    let contenido = serde_json::to_string_pretty(geocercas)
        .map_err(|e| AppError::Internal(format!("Error serializando geocercas: {}", e)))?;

    Ok(ArchivoExportado {
        nombre: format!("geocercas-maestras-{}.json", fecha.format("%Y-%m-%d")),
        tipo_contenido: "application/json",
        contenido,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geocerca::geocercas_semilla;
    use crate::models::registro::registros_semilla;

    fn fecha() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 20).unwrap()
    }

    #[test]
    fn test_csv_de_registros() {
        let archivo = registros_csv(&registros_semilla(), fecha()).unwrap();
        assert_eq!(archivo.nombre, "detalle_registros_2025-07-20.csv");

        let lineas: Vec<&str> = archivo.contenido.split("\r\n").collect();
        assert_eq!(lineas.len(), 6);
        assert!(lineas[0].starts_with("id,fecha,hora_ingreso"));
        // la ubicación tiene comas y va entre comillas
        assert_eq!(
            lineas[1],
            "R-1001,2025-07-17,08:30,08:55,PLATAZO LUIS,\"Av. Amazonas y Quito, Centro, Quito\",P-2001,,Sebastián Moreno,X,,120"
        );
    }

    #[test]
    fn test_csv_escapa_comillas() {
        assert_eq!(celda_csv(r#"Tienda "El Sol""#), r#""Tienda ""El Sol""""#);
        assert_eq!(celda_csv("linea\nnueva"), "\"linea\nnueva\"");
        assert_eq!(celda_csv("simple"), "simple");
    }

    #[test]
    fn test_csv_sin_registros() {
        let err = registros_csv(&[], fecha()).unwrap_err();
        assert_eq!(err.mensaje_usuario(), MSG_SIN_REGISTROS);
    }

    #[test]
    fn test_json_de_geocercas() {
        let archivo = geocercas_json(&geocercas_semilla(), fecha()).unwrap();
        assert_eq!(archivo.nombre, "geocercas-maestras-2025-07-20.json");
        let valor: serde_json::Value = serde_json::from_str(&archivo.contenido).unwrap();
        assert_eq!(valor.as_array().unwrap().len(), 3);
        assert_eq!(valor[0]["forma"], "circulo");
        assert!(valor[0].get("puntos").is_none());
        assert!(archivo.contenido.contains("\n  "));
    }
}
