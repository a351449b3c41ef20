//! Filtrado de listados
//!
//! Todos los filtros trabajan sobre un préstamo de la colección y devuelven un
//! `Vec` nuevo; la colección original nunca se modifica.

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::models::geocerca::{Forma, Geocerca, TipoGeocerca};
use crate::models::registro::Registro;
use crate::models::vendedor::{EstadoVendedor, Vendedor};

/// Entidades con un conjunto fijo de campos de texto buscables
pub trait Filtrable {
    fn campos_busqueda(&self) -> Vec<&str>;

    /// Substring sin distinguir mayúsculas en cualquiera de los campos.
    /// `termino` debe llegar ya en minúsculas.
    fn coincide(&self, termino: &str) -> bool {
        self.campos_busqueda()
            .iter()
            .any(|campo| campo.to_lowercase().contains(termino))
    }
}

impl Filtrable for Geocerca {
    fn campos_busqueda(&self) -> Vec<&str> {
        vec![&self.nombre, &self.descripcion, &self.zona]
    }
}

impl Filtrable for Vendedor {
    fn campos_busqueda(&self) -> Vec<&str> {
        let mut campos = vec![self.nombre.as_str(), self.codigo.as_str()];
        campos.extend(
            [
                &self.apellidos,
                &self.telefono,
                &self.direccion,
                &self.distrito,
                &self.ruc,
                &self.ciudad,
                &self.zona,
            ]
            .into_iter()
            .filter_map(|campo| campo.as_deref()),
        );
        campos
    }
}

/// Aplica el término de búsqueda y el predicado categórico.
/// Un término vacío (o solo espacios) no filtra por texto.
pub fn filtrar<T, P>(coleccion: &[T], termino: &str, predicado: P) -> Vec<T>
where
    T: Filtrable + Clone,
    P: Fn(&T) -> bool,
{
    let termino = termino.trim().to_lowercase();
    coleccion
        .iter()
        .filter(|item| termino.is_empty() || item.coincide(&termino))
        .filter(|item| predicado(item))
        .cloned()
        .collect()
}

/// "todos" o vacío significa sin filtro
fn valor_filtro(valor: Option<&str>) -> Option<String> {
    valor
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty() && v != "todos")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiltrosGeocerca {
    pub termino: String,
    pub tipo: Option<TipoGeocerca>,
    pub activa: Option<bool>,
    pub forma: Option<Forma>,
}

impl FiltrosGeocerca {
    /// Construye los filtros desde los valores crudos de la query.
    /// Valores desconocidos se ignoran.
    pub fn desde_query(
        termino: Option<&str>,
        tipo: Option<&str>,
        estado: Option<&str>,
        forma: Option<&str>,
    ) -> Self {
        let tipo = valor_filtro(tipo).and_then(|t| {
            serde_json::from_value::<TipoGeocerca>(serde_json::Value::String(t)).ok()
        });
        let activa = valor_filtro(estado).and_then(|e| match e.as_str() {
            "activa" => Some(true),
            "inactiva" => Some(false),
            _ => None,
        });
        let forma = valor_filtro(forma).and_then(|f| match f.as_str() {
            "circulo" => Some(Forma::Circulo),
            "poligono" => Some(Forma::Poligono),
            _ => None,
        });

        Self {
            termino: termino.unwrap_or_default().to_string(),
            tipo,
            activa,
            forma,
        }
    }

    pub fn aplicar(&self, geocercas: &[Geocerca]) -> Vec<Geocerca> {
        filtrar(geocercas, &self.termino, |g| {
            self.tipo.map_or(true, |t| g.tipo == t)
                && self.activa.map_or(true, |a| g.activa == a)
                && self.forma.map_or(true, |f| g.forma() == f)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiltrosVendedor {
    pub termino: String,
    pub estado: Option<EstadoVendedor>,
}

impl FiltrosVendedor {
    pub fn desde_query(termino: Option<&str>, estado: Option<&str>) -> Self {
        let estado = valor_filtro(estado).and_then(|e| match e.as_str() {
            "activo" => Some(EstadoVendedor::Activo),
            "inactivo" => Some(EstadoVendedor::Inactivo),
            "ocupado" => Some(EstadoVendedor::Ocupado),
            _ => None,
        });
        Self {
            termino: termino.unwrap_or_default().to_string(),
            estado,
        }
    }

    pub fn aplicar(&self, vendedores: &[Vendedor]) -> Vec<Vendedor> {
        filtrar(vendedores, &self.termino, |v| {
            self.estado.map_or(true, |e| v.estado == e)
        })
    }
}

/// Filtros del detalle de registros
#[derive(Debug, Clone, PartialEq)]
pub struct FiltrosRegistro {
    pub vendedor: String,
    pub cliente: String,
    pub desde: NaiveDate,
    /// Inclusivo: cubre todo el día
    pub hasta: NaiveDate,
    pub mostrar_pedidos: bool,
    pub mostrar_cobros: bool,
}

impl FiltrosRegistro {
    /// Rango por defecto: un día antes del registro más antiguo hasta un día
    /// después del más reciente; sin datos, los últimos 7 días.
    pub fn rango_por_defecto(registros: &[Registro]) -> (NaiveDate, NaiveDate) {
        let fechas: Vec<NaiveDate> = registros
            .iter()
            .filter_map(|r| NaiveDate::parse_from_str(&r.fecha, "%Y-%m-%d").ok())
            .collect();

        match (fechas.iter().min(), fechas.iter().max()) {
            (Some(min), Some(max)) => (*min - Duration::days(1), *max + Duration::days(1)),
            _ => {
                let hoy = Utc::now().date_naive();
                (hoy - Duration::days(7), hoy)
            }
        }
    }

    pub fn por_defecto(registros: &[Registro]) -> Self {
        let (desde, hasta) = Self::rango_por_defecto(registros);
        Self {
            vendedor: String::new(),
            cliente: String::new(),
            desde,
            hasta,
            mostrar_pedidos: true,
            mostrar_cobros: true,
        }
    }

    pub fn aplicar(&self, registros: &[Registro]) -> Vec<Registro> {
        let vendedor = self.vendedor.trim().to_lowercase();
        let cliente = self.cliente.trim().to_lowercase();

        registros
            .iter()
            .filter(|r| vendedor.is_empty() || r.vendedor.to_lowercase().contains(&vendedor))
            .filter(|r| {
                cliente.is_empty()
                    || r.cliente
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&cliente))
            })
            .filter(|r| {
                NaiveDate::parse_from_str(&r.fecha, "%Y-%m-%d")
                    .map(|f| f >= self.desde && f <= self.hasta)
                    .unwrap_or(false)
            })
            .filter(|r| {
                // visitas sin pedido ni cobro siempre se muestran
                (r.pedido && self.mostrar_pedidos)
                    || (r.cobro && self.mostrar_cobros)
                    || (!r.pedido && !r.cobro)
            })
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadisticasGeocercas {
    pub total: usize,
    pub activas: usize,
    pub inactivas: usize,
}

impl EstadisticasGeocercas {
    pub fn de(geocercas: &[Geocerca]) -> Self {
        let activas = geocercas.iter().filter(|g| g.activa).count();
        Self {
            total: geocercas.len(),
            activas,
            inactivas: geocercas.len() - activas,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadisticasVendedores {
    pub total: usize,
    pub activos: usize,
    pub inactivos: usize,
    pub ocupados: usize,
    pub total_ventas_hoy: u32,
    pub total_clientes: u32,
}

impl EstadisticasVendedores {
    pub fn de(vendedores: &[Vendedor]) -> Self {
        let contar = |estado| vendedores.iter().filter(|v| v.estado == estado).count();
        Self {
            total: vendedores.len(),
            activos: contar(EstadoVendedor::Activo),
            inactivos: contar(EstadoVendedor::Inactivo),
            ocupados: contar(EstadoVendedor::Ocupado),
            total_ventas_hoy: vendedores.iter().map(|v| v.ventas_hoy).sum(),
            total_clientes: vendedores.iter().map(|v| v.clientes_visitados).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geocerca::geocercas_semilla;
    use crate::models::registro::registros_semilla;

    fn vendedor(codigo: &str, nombre: &str, ciudad: Option<&str>, estado: EstadoVendedor) -> Vendedor {
        Vendedor {
            id: codigo.to_string(),
            codigo: codigo.to_string(),
            nombre: nombre.to_string(),
            apellidos: None,
            telefono: None,
            telefono2: None,
            direccion: None,
            distrito: None,
            ruc: None,
            zona: None,
            ciudad: ciudad.map(str::to_string),
            representante: None,
            lat: 0.0,
            lng: 0.0,
            estado,
            comision: None,
            fecha_registro: None,
            ventas_hoy: 2,
            clientes_visitados: 3,
        }
    }

    #[test]
    fn test_termino_vacio_no_filtra() {
        let semilla = geocercas_semilla();
        assert_eq!(filtrar(&semilla, "", |_| true).len(), semilla.len());
        assert_eq!(filtrar(&semilla, "   ", |_| true).len(), semilla.len());
    }

    #[test]
    fn test_busqueda_sin_mayusculas_en_cualquier_campo() {
        let vendedores = vec![
            vendedor("V001", "Luis", Some("Quito"), EstadoVendedor::Activo),
            vendedor("V002", "Ana", Some("Guayaquil"), EstadoVendedor::Inactivo),
        ];
        let por_ciudad = filtrar(&vendedores, "GUAYA", |_| true);
        assert_eq!(por_ciudad.len(), 1);
        assert_eq!(por_ciudad[0].codigo, "V002");

        let por_codigo = filtrar(&vendedores, "v001", |_| true);
        assert_eq!(por_codigo[0].nombre, "Luis");

        assert!(filtrar(&vendedores, "cuenca", |_| true).is_empty());
        // la colección original sigue intacta
        assert_eq!(vendedores.len(), 2);
    }

    #[test]
    fn test_filtros_categoricos_de_geocercas() {
        let semilla = geocercas_semilla();

        let todos = FiltrosGeocerca::desde_query(None, Some("todos"), Some(""), None);
        assert_eq!(todos.aplicar(&semilla).len(), 3);

        let inactivas = FiltrosGeocerca::desde_query(None, None, Some("inactiva"), None);
        assert!(inactivas.aplicar(&semilla).iter().all(|g| !g.activa));

        let poligonos = FiltrosGeocerca::desde_query(None, None, None, Some("poligono"));
        let resultado = poligonos.aplicar(&semilla);
        assert_eq!(resultado.len(), 1);
        assert_eq!(resultado[0].id, "gc-003");

        let combinado = FiltrosGeocerca::desde_query(Some("centro"), None, Some("activa"), Some("circulo"));
        assert!(combinado
            .aplicar(&semilla)
            .iter()
            .all(|g| g.activa && g.forma() == Forma::Circulo));
    }

    #[test]
    fn test_filtro_estado_vendedor() {
        let vendedores = vec![
            vendedor("V001", "Luis", None, EstadoVendedor::Activo),
            vendedor("V002", "Ana", None, EstadoVendedor::Inactivo),
            vendedor("V003", "Eva", None, EstadoVendedor::Activo),
        ];
        let activos = FiltrosVendedor::desde_query(None, Some("activo")).aplicar(&vendedores);
        assert_eq!(activos.len(), 2);
        let todos = FiltrosVendedor::desde_query(Some(""), Some("todos")).aplicar(&vendedores);
        assert_eq!(todos.len(), 3);
    }

    #[test]
    fn test_rango_de_fechas_inclusivo() {
        let registros = registros_semilla();
        let (desde, hasta) = FiltrosRegistro::rango_por_defecto(&registros);
        assert_eq!(desde, NaiveDate::from_ymd_opt(2025, 7, 16).unwrap());
        assert_eq!(hasta, NaiveDate::from_ymd_opt(2025, 7, 20).unwrap());

        let mut filtros = FiltrosRegistro::por_defecto(&registros);
        assert_eq!(filtros.aplicar(&registros).len(), 5);

        filtros.desde = NaiveDate::from_ymd_opt(2025, 7, 18).unwrap();
        filtros.hasta = NaiveDate::from_ymd_opt(2025, 7, 18).unwrap();
        assert_eq!(filtros.aplicar(&registros).len(), 2);
    }

    #[test]
    fn test_filtros_de_registros() {
        let registros = registros_semilla();
        let mut filtros = FiltrosRegistro::por_defecto(&registros);

        filtros.vendedor = "platazo".to_string();
        assert_eq!(filtros.aplicar(&registros).len(), 2);

        filtros.vendedor.clear();
        filtros.cliente = "abc".to_string();
        assert_eq!(filtros.aplicar(&registros)[0].id, "R-1003");

        filtros.cliente.clear();
        filtros.mostrar_cobros = false;
        let sin_cobros = filtros.aplicar(&registros);
        assert!(sin_cobros.iter().all(|r| r.pedido));
        assert_eq!(sin_cobros.len(), 3);
    }

    #[test]
    fn test_rango_sin_datos() {
        let (desde, hasta) = FiltrosRegistro::rango_por_defecto(&[]);
        assert_eq!(hasta - desde, Duration::days(7));
    }

    #[test]
    fn test_estadisticas() {
        let e = EstadisticasGeocercas::de(&geocercas_semilla());
        assert_eq!((e.total, e.activas, e.inactivas), (3, 2, 1));

        let vendedores = vec![
            vendedor("V001", "Luis", None, EstadoVendedor::Activo),
            vendedor("V002", "Ana", None, EstadoVendedor::Ocupado),
        ];
        let v = EstadisticasVendedores::de(&vendedores);
        assert_eq!(v.activos, 1);
        assert_eq!(v.ocupados, 1);
        assert_eq!(v.total_ventas_hoy, 4);
        assert_eq!(v.total_clientes, 6);
    }
}
