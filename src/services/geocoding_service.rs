use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::config::EnvironmentConfig;

/// Consultas más cortas se ignoran
pub const LONGITUD_MINIMA_CONSULTA: usize = 2;
const LIMITE_SUGERENCIAS: u32 = 8;

/// Sugerencia de lugar lista para mostrar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lugar {
    pub nombre: String,
    pub direccion: String,
    pub direccion_completa: String,
    pub icono: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimResultado {
    #[serde(default)]
    lat: Option<String>,
    #[serde(default)]
    lon: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    tipo: Option<String>,
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    address: Option<NominatimDireccion>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimDireccion {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,
    road: Option<String>,
    state: Option<String>,
}

impl NominatimResultado {
    fn nombre(&self) -> String {
        if let Some(a) = &self.address {
            return [&a.city, &a.town, &a.village, &a.hamlet, &a.suburb, &a.neighbourhood, &self.name]
                .into_iter()
                .find_map(|v| v.clone())
                .unwrap_or_else(|| "Ubicación".to_string());
        }
        self.name
            .clone()
            .or_else(|| {
                self.display_name
                    .as_deref()
                    .and_then(|d| d.split(',').next())
                    .map(|s| s.trim().to_string())
            })
            .unwrap_or_else(|| "Ubicación".to_string())
    }

    fn direccion(&self) -> String {
        let completa = self.display_name.clone();
        if let Some(a) = &self.address {
            let mut partes: Vec<&str> = Vec::new();
            if let Some(road) = &a.road {
                partes.push(road);
            }
            if let Some(suburb) = &a.suburb {
                if a.city.as_ref() != Some(suburb) {
                    partes.push(suburb);
                }
            }
            if let Some(city) = &a.city {
                partes.push(city);
            }
            if let Some(state) = &a.state {
                partes.push(state);
            }
            if !partes.is_empty() {
                return partes.join(", ");
            }
        }
        completa.unwrap_or_else(|| "Sin dirección disponible".to_string())
    }

    fn icono(&self) -> &'static str {
        let tipo = self
            .tipo
            .as_deref()
            .or(self.class.as_deref())
            .unwrap_or_default();
        let contiene = |claves: &[&str]| claves.iter().any(|c| tipo.contains(c));

        if contiene(&["city"]) {
            "🏙️"
        } else if contiene(&["town"]) {
            "🏘️"
        } else if contiene(&["village"]) {
            "🏡"
        } else if contiene(&["road", "street"]) {
            "🛣️"
        } else if contiene(&["amenity"]) {
            "🏢"
        } else if contiene(&["shop", "commercial"]) {
            "🏪"
        } else if contiene(&["school", "university"]) {
            "🏫"
        } else if contiene(&["hospital", "clinic"]) {
            "🏥"
        } else if contiene(&["park", "garden"]) {
            "🏞️"
        } else {
            "📍"
        }
    }

    /// Solo se aceptan resultados con nombre y coordenadas válidas
    fn a_lugar(&self) -> Option<Lugar> {
        let display_name = self.display_name.clone()?;
        let lat = self.lat.as_deref()?.parse::<f64>().ok()?;
        let lng = self.lon.as_deref()?.parse::<f64>().ok()?;
        Some(Lugar {
            nombre: self.nombre(),
            direccion: self.direccion(),
            direccion_completa: display_name,
            icono: self.icono().to_string(),
            lat,
            lng,
        })
    }
}

pub struct GeocodingService {
    base_url: String,
    pais: String,
    nombre_pais: String,
    client: reqwest::Client,
}

impl GeocodingService {
    pub fn new(config: &EnvironmentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("Geocercas/1.0")
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            base_url: config.nominatim_url.trim_end_matches('/').to_string(),
            pais: config.geocoding_country.clone(),
            nombre_pais: config.geocoding_country_name.clone(),
            client,
        })
    }

    /// Agrega el nombre del país si la consulta no lo incluye
    pub fn consulta_con_pais(&self, consulta: &str) -> String {
        if consulta.to_lowercase().contains(&self.nombre_pais.to_lowercase()) {
            consulta.to_string()
        } else {
            format!("{}, {}", consulta, self.nombre_pais)
        }
    }

    pub fn url_busqueda(&self, consulta: &str) -> String {
        format!(
            "{}/search?format=json&q={}&limit={}&countrycodes={}&addressdetails=1",
            self.base_url,
            urlencoding::encode(&self.consulta_con_pais(consulta)),
            LIMITE_SUGERENCIAS,
            self.pais
        )
    }

    /// Sugerencias de lugares. Consultas de menos de dos caracteres no generan petición.
    pub async fn buscar_lugares(&self, consulta: &str) -> Result<Vec<Lugar>> {
        let consulta = consulta.trim();
        if consulta.chars().count() < LONGITUD_MINIMA_CONSULTA {
            return Ok(Vec::new());
        }

        let url = self.url_busqueda(consulta);
        log::info!("🗺️ Buscando lugares: {}", consulta);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::error!("❌ Búsqueda de lugares fallida con status {}", status);
            return Err(anyhow!("Geocoding failed: {}", status));
        }

        let response_text = response.text().await?;
        let lugares = parsear_resultados(&response_text)?;
        log::info!("✅ {} lugares encontrados para '{}'", lugares.len(), consulta);
        Ok(lugares)
    }
}

fn parsear_resultados(cuerpo: &str) -> Result<Vec<Lugar>> {
    let resultados: Vec<NominatimResultado> = serde_json::from_str(cuerpo)
        .map_err(|e| anyhow!("Failed to parse geocoding response: {}", e))?;
    Ok(resultados.iter().filter_map(NominatimResultado::a_lugar).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn servicio() -> GeocodingService {
        GeocodingService::new(&EnvironmentConfig::for_tests()).unwrap()
    }

    #[test]
    fn test_consulta_agrega_pais() {
        let s = servicio();
        assert_eq!(s.consulta_con_pais("Cuenca"), "Cuenca, Ecuador");
        assert_eq!(s.consulta_con_pais("Quito ecuador"), "Quito ecuador");
        let url = s.url_busqueda("La Mariscal");
        assert!(url.contains("q=La%20Mariscal%2C%20Ecuador"));
        assert!(url.contains("limit=8&countrycodes=ec&addressdetails=1"));
    }

    #[tokio::test]
    async fn test_consulta_corta_no_busca() {
        assert!(servicio().buscar_lugares("Q").await.unwrap().is_empty());
        assert!(servicio().buscar_lugares("  ").await.unwrap().is_empty());
    }

    #[test]
    fn test_normaliza_resultados() {
        let cuerpo = r#"[
            {"lat":"-0.2032","lon":"-78.4910","display_name":"La Mariscal, Quito, Pichincha, Ecuador",
             "type":"suburb","address":{"suburb":"La Mariscal","city":"Quito","state":"Pichincha","road":"Av. Amazonas"}},
            {"lat":"-2.19","lon":"-79.88","display_name":"Guayaquil, Guayas, Ecuador","type":"city",
             "address":{"city":"Guayaquil","suburb":"Guayaquil","state":"Guayas"}},
            {"lat":"x","lon":"-79.88","display_name":"sin coordenadas"},
            {"lat":"-1.0","lon":"-78.0"}
        ]"#;
        let lugares = parsear_resultados(cuerpo).unwrap();
        assert_eq!(lugares.len(), 2);

        assert_eq!(lugares[0].nombre, "Quito");
        assert_eq!(lugares[0].direccion, "Av. Amazonas, La Mariscal, Quito, Pichincha");
        assert_eq!(lugares[0].icono, "📍");

        assert_eq!(lugares[1].direccion, "Guayaquil, Guayas");
        assert_eq!(lugares[1].icono, "🏙️");
    }

    #[test]
    fn test_sin_direccion_usa_display_name() {
        let cuerpo = r#"[{"lat":"0.1","lon":"-78.1","display_name":"Mitad del Mundo, Pichincha","class":"tourism"}]"#;
        let lugares = parsear_resultados(cuerpo).unwrap();
        assert_eq!(lugares[0].nombre, "Mitad del Mundo");
        assert_eq!(lugares[0].direccion, "Mitad del Mundo, Pichincha");
    }
}
