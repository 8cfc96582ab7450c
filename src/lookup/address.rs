//! Normalized address records, one schema per provider.

use serde::{Deserialize, Serialize};

use crate::providers::ProviderKind;

/// Address as returned by BrasilAPI's CEP v1 endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BrasilApiAddress {
    pub cep: String,
    pub state: String,
    pub city: String,
    pub neighborhood: String,
    pub street: String,
    /// Upstream service BrasilAPI itself resolved the CEP with.
    pub service: String,
}

/// Address as returned by ViaCep.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ViaCepAddress {
    pub cep: String,
    #[serde(rename = "logradouro")]
    pub street: String,
    #[serde(rename = "complemento")]
    pub complement: String,
    #[serde(rename = "bairro")]
    pub district: String,
    #[serde(rename = "localidade")]
    pub city: String,
    #[serde(rename = "uf")]
    pub state: String,
    /// IBGE municipality code.
    pub ibge: String,
    /// GIA tax registry code (São Paulo only, often empty).
    pub gia: String,
    /// Telephone area code.
    pub ddd: String,
    /// SIAFI treasury municipality code.
    pub siafi: String,
}

/// The address produced by whichever provider won the race.
///
/// Serializes as the provider's native JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AddressRecord {
    BrasilApi(BrasilApiAddress),
    ViaCep(ViaCepAddress),
}

impl AddressRecord {
    /// Decode `body` with the schema belonging to `provider`.
    pub fn normalize(provider: ProviderKind, body: &[u8]) -> Result<Self, serde_json::Error> {
        match provider {
            ProviderKind::BrasilApi => serde_json::from_slice(body).map(AddressRecord::BrasilApi),
            ProviderKind::ViaCep => serde_json::from_slice(body).map(AddressRecord::ViaCep),
        }
    }

    pub fn provider(&self) -> ProviderKind {
        match self {
            AddressRecord::BrasilApi(_) => ProviderKind::BrasilApi,
            AddressRecord::ViaCep(_) => ProviderKind::ViaCep,
        }
    }

    pub fn cep(&self) -> &str {
        match self {
            AddressRecord::BrasilApi(a) => &a.cep,
            AddressRecord::ViaCep(a) => &a.cep,
        }
    }

    pub fn city(&self) -> &str {
        match self {
            AddressRecord::BrasilApi(a) => &a.city,
            AddressRecord::ViaCep(a) => &a.city,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const BRASIL_API: &str = r#"{
        "cep": "01001000",
        "state": "SP",
        "city": "São Paulo",
        "neighborhood": "Sé",
        "street": "Praça da Sé",
        "service": "open-cep"
    }"#;

    const VIA_CEP: &str = r#"{
        "cep": "01001-000",
        "logradouro": "Praça da Sé",
        "complemento": "lado ímpar",
        "unidade": "",
        "bairro": "Sé",
        "localidade": "São Paulo",
        "uf": "SP",
        "estado": "São Paulo",
        "regiao": "Sudeste",
        "ibge": "3550308",
        "gia": "1004",
        "ddd": "11",
        "siafi": "7107"
    }"#;

    #[test]
    fn test_brasil_api_fields_survive() {
        let record = AddressRecord::normalize(ProviderKind::BrasilApi, BRASIL_API.as_bytes()).unwrap();
        assert_eq!(record.provider(), ProviderKind::BrasilApi);
        assert_eq!(record.cep(), "01001000");
        assert_eq!(record.city(), "São Paulo");

        let input: Value = serde_json::from_str(BRASIL_API).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), input);
    }

    #[test]
    fn test_via_cep_fields_survive() {
        let record = AddressRecord::normalize(ProviderKind::ViaCep, VIA_CEP.as_bytes()).unwrap();
        let AddressRecord::ViaCep(address) = &record else {
            panic!("expected a ViaCep record, got {:?}", record);
        };
        assert_eq!(address.street, "Praça da Sé");
        assert_eq!(address.complement, "lado ímpar");
        assert_eq!(address.district, "Sé");
        assert_eq!(address.state, "SP");
        assert_eq!(address.ddd, "11");

        // Extra upstream fields are dropped, listed ones keep their native names.
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "cep": "01001-000",
                "logradouro": "Praça da Sé",
                "complemento": "lado ímpar",
                "bairro": "Sé",
                "localidade": "São Paulo",
                "uf": "SP",
                "ibge": "3550308",
                "gia": "1004",
                "ddd": "11",
                "siafi": "7107"
            })
        );
    }

    #[test]
    fn test_schema_follows_provider_tag() {
        // A ViaCep body is missing BrasilAPI's fields.
        assert!(AddressRecord::normalize(ProviderKind::BrasilApi, VIA_CEP.as_bytes()).is_err());
        assert!(AddressRecord::normalize(ProviderKind::ViaCep, BRASIL_API.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_error_payloads() {
        assert!(AddressRecord::normalize(ProviderKind::ViaCep, br#"{"erro": "true"}"#).is_err());
        assert!(AddressRecord::normalize(
            ProviderKind::BrasilApi,
            r#"{"name":"CepPromiseError","message":"Todos os serviços de CEP retornaram erro.","type":"service_error"}"#
                .as_bytes()
        )
        .is_err());
        assert!(AddressRecord::normalize(ProviderKind::ViaCep, b"<html>502</html>").is_err());
    }

    #[test]
    fn test_rejects_wrong_field_types() {
        let body = BRASIL_API.replace(r#""city": "São Paulo""#, r#""city": 42"#);
        assert!(AddressRecord::normalize(ProviderKind::BrasilApi, body.as_bytes()).is_err());
    }
}
