//! Normalização de números de telefone para o formato internacional brasileiro
//!
//! O formato canônico é apenas dígitos, prefixado pelo código do país `55`,
//! com 13 dígitos no total (`55` + DDD + número de 9 dígitos).
//!
//! # Exemplos
//! ```
//! use disparador_planilhas::utils::normalization::normalize_phone;
//!
//! assert_eq!(normalize_phone("(11) 99999-9999").as_deref(), Some("5511999999999"));
//! assert_eq!(normalize_phone("555511999999999").as_deref(), Some("5511999999999"));
//! assert_eq!(normalize_phone(""), None);
//! ```

/// Código do país (Brasil)
pub const COUNTRY_CODE: &str = "55";

/// Comprimento do número canônico: 2 (país) + 2 (DDD) + 9 (assinante)
pub const CANONICAL_LEN: usize = 13;

/// Comprimento de um número local com DDD, sem código do país
const LOCAL_LEN: usize = 11;

/// Normaliza um número bruto para o formato canônico
///
/// Retorna `None` quando não há nenhum dígito para trabalhar.
///
/// Regras, em ordem:
/// 1. Remove tudo que não é dígito
/// 2. 11 dígitos → prefixa `55`
/// 3. Começa com `55` e tem 13 dígitos → mantém
/// 4. Começa com `55` e tem mais de 13 → remove `55` do início até caber
/// 5. Não começa com `55` → prefixa `55`
/// 6. Caso contrário mantém como está
///
/// Um número local que por acaso comece com `55` (DDD 55, RS) e venha com
/// prefixo duplicado é indistinguível de um prefixo repetido; a regra 4 é
/// aplicada mesmo assim.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return None;
    }

    if digits.len() == LOCAL_LEN {
        return Some(format!("{}{}", COUNTRY_CODE, digits));
    }

    if digits.starts_with(COUNTRY_CODE) && digits.len() == CANONICAL_LEN {
        return Some(digits);
    }

    while digits.starts_with(COUNTRY_CODE) && digits.len() > CANONICAL_LEN {
        digits.drain(..COUNTRY_CODE.len());
    }

    if !digits.starts_with(COUNTRY_CODE) {
        return Some(format!("{}{}", COUNTRY_CODE, digits));
    }

    Some(digits)
}

/// Verifica se o número já está no formato canônico
pub fn is_canonical(number: &str) -> bool {
    number.len() == CANONICAL_LEN
        && number.starts_with(COUNTRY_CODE)
        && number.chars().all(|c| c.is_ascii_digit())
}
