//! Reply texts
//!
//! Prompts that invite the customer to undo a step end with [`BACK_HINT`].

use zailo_bot_text_processing::format_currency;

pub const BACK_HINT: &str =
    "(Digite *\"voltar\"* a qualquer momento para retornar ao passo anterior)";

fn with_hint(text: &str) -> String {
    format!("{}\n\n{}", text, BACK_HINT)
}

// Global

pub const GOING_BACK: &str = "Ok, retornando ao passo anterior.";
pub const NOTHING_TO_GO_BACK: &str = "Não há um passo anterior para retornar no momento.";
pub const NOT_READY: &str =
    "Olá, estou me conectando. Por favor, envie sua mensagem novamente em instantes.";
pub const GENERIC_ERROR: &str = "Ocorreu um erro inesperado em nosso sistema. Já notificamos a equipe responsável. Por favor, tente novamente mais tarde.";
pub const SLOW_SYSTEM: &str = "Nosso sistema está demorando mais que o normal para responder. Por favor, envie sua mensagem novamente em alguns instantes.";

pub fn bot_connected(timestamp: &str) -> String {
    format!("✅ *Bot Conectado!*\n*Horário:* {}", timestamp)
}

// Greeting and vehicle choice

pub fn intro(assistant: &str, store: &str) -> String {
    format!("Olá! Eu sou o {}, o assistente virtual da *{}*.", assistant, store)
}

pub fn intro_full(assistant: &str, store: &str) -> String {
    format!(
        "Olá! Eu sou o {}, o assistente virtual da *{}*. Estou aqui para agilizar seu atendimento.",
        assistant, store
    )
}

pub fn intro_car_interest(assistant: &str) -> String {
    format!(
        "Olá! Eu sou o {}. Notei seu interesse em um de nossos carros, vamos iniciar.",
        assistant
    )
}

pub const ASK_PREFERENCE: &str = "Já tem um veículo específico em mente ou prefere que eu envie uma lista com nosso estoque completo?";
pub const INTEREST_REMINDER: &str = "Olá! Estou à sua disposição. Por favor, me diga o nome do veículo de seu interesse ou responda \"lista\" para ver nosso estoque. 😉";
pub const FETCHING_STOCK: &str = "Certo. Buscando os carros em nosso estoque...";
pub const PICK_A_MODEL: &str =
    "Se algum veículo lhe interessar, por favor, me informe o nome do modelo. 😉";
pub const SEVERAL_MATCHES: &str =
    "Encontrei alguns modelos que correspondem à sua busca. Qual deles você gostaria de ver?";
pub const NO_MATCH: &str =
    "Não encontrei esse modelo. Para facilitar, posso enviar a lista completa do nosso estoque.";

pub fn great_choice(name: &str) -> String {
    format!("Ótima escolha! Aqui estão os detalhes do *{}*:", name)
}

pub const ASK_PROCEED: &str =
    "Gostaria de prosseguir com a compra deste veículo? (Responda \"sim\" ou \"não\")";
pub const SHOW_LIST_AGAIN: &str =
    "Sem problemas. Aqui está nossa lista de veículos novamente. Qual outro modelo lhe interessa?";
pub const CONFIRM_NOT_UNDERSTOOD: &str = "Não compreendi sua resposta. Por favor, responda \"sim\" para confirmar a escolha do veículo ou \"não\" para ver outro.";

pub fn confirm_choice(name: &str) -> String {
    format!("Perfeito! Confirma a sua escolha pelo *{}*?", name)
}

// Payment

pub fn payment_menu() -> String {
    with_hint("Como você gostaria de prosseguir com o pagamento?\n\n*1* - À vista\n*2* - Financiamento\n*3* - Tenho um carro para dar na troca\n*4* - Gostaria de agendar uma visita para ver o carro")
}

pub const PAYMENT_NOT_UNDERSTOOD: &str = "Desculpe, não entendi. Por favor, escolha uma das opções: 1 (à vista), 2 (financiamento), 3 (troca) ou 4 (visita).";

pub fn cash_ask_name() -> String {
    with_hint("Certo. Para prosseguirmos, qual o seu nome completo, por favor?")
}

pub fn financing_ask_down_payment() -> String {
    with_hint("Certo, vamos fazer uma simulação de financiamento. O senhor(a) pretende dar algum valor de entrada? (Responda \"sim\" ou \"não\")")
}

pub fn trade_in_ask_model() -> String {
    with_hint("Perfeito. Para iniciarmos a avaliação do seu veículo para a troca, qual o *modelo e ano* dele? (Ex: Fiat Uno 2018)")
}

pub const VISIT_HANDOFF: &str = "Excelente. Agendamentos de visita são feitos diretamente com nossos vendedores para garantir o melhor atendimento. Já estamos encaminhando seu contato.";

// Cash

pub fn cash_done(name: &str) -> String {
    format!(
        "Obrigado, {}. Já estou passando seu contato para um de nossos vendedores. Ele entrará em contato em breve para finalizar a compra.🚀",
        name
    )
}

// Financing

pub fn ask_down_payment_value() -> String {
    with_hint("Entendido. Qual o valor da entrada?")
}

pub const DOWN_PAYMENT_NOT_UNDERSTOOD: &str =
    "Não compreendi. Você deseja dar um valor de entrada? (Responda \"sim\" ou \"não\")";
pub const NO_DOWN_PAYMENT: &str =
    "Certo, sem entrada. A simulação será com o valor total do veículo.";

pub fn down_payment_summary(down_payment: f64, to_finance: f64) -> String {
    format!(
        "Certo. Com uma entrada de {}, o valor a ser financiado será de *{}*. Confirma?",
        format_currency(Some(down_payment)),
        format_currency(Some(to_finance))
    )
}

pub fn invalid_down_payment() -> String {
    with_hint("O valor da entrada parece inválido ou é maior que o valor do carro. Por favor, informe um valor correto.")
}

pub const DOCUMENTS_CHECKLIST: &str = "Ótimo! Para darmos início à sua simulação, precisarei de alguns dados. Serão necessários:\n- Nome Completo\n- CPF e RG\n- Foto do seu Comprovante de Renda\n- Foto do seu RG ou CNH\n\nVocê tem esses documentos em mãos e deseja prosseguir agora?";
pub const DOCUMENTS_LATER: &str = "Tudo bem. Quando estiver com os documentos prontos, é só me chamar. Se quiser, podemos explorar outra forma de pagamento ou ver outro carro.";
pub const DOCUMENTS_NOT_UNDERSTOOD: &str =
    "Não compreendi. Por favor, responda \"sim\" para continuar ou \"não\" para ver outras opções.";

pub fn ask_installments() -> String {
    with_hint("Temos opções de 12x, 24x, 36x, 48x e 60x. Em quantas vezes você gostaria de simular?")
}

pub fn installments_chosen(installments: u64) -> String {
    with_hint(&format!(
        "Entendido, simulação para {}x. Agora, qual o seu nome completo?",
        installments
    ))
}

pub fn invalid_installments() -> String {
    with_hint("Não compreendi ou a opção não é válida. Por favor, escolha entre 12, 24, 36, 48 ou 60 vezes.")
}

pub fn financing_ask_name() -> String {
    with_hint("Qual o seu nome completo?")
}

pub fn ask_job() -> String {
    with_hint("Qual a sua profissão ou cargo atual?")
}

pub fn ask_cpf() -> String {
    with_hint("Agradeço. Por favor, me informe seu CPF (apenas números).")
}

pub const INVALID_CPF: &str = "CPF inválido. Por favor, informe os 11 dígitos, sem pontos ou traços.";

pub fn ask_rg() -> String {
    with_hint("CPF recebido. E qual o seu RG? (apenas números)")
}

pub fn ask_income_proof() -> String {
    with_hint("Ótimo. Agora preciso de uma foto do seu comprovante de renda mais recente.")
}

pub const INCOME_PROOF_MISSING: &str = "Por favor, envie o comprovante como uma imagem ou PDF.";

pub fn ask_rg_photo() -> String {
    with_hint("Comprovante recebido. Por último, envie uma foto do seu RG ou CNH (frente e verso, se possível).")
}

pub const RG_PHOTO_MISSING: &str = "Por favor, envie a foto do seu documento.";
pub const FINANCING_DONE: &str = "Tudo certo! Recebi a documentação. Suas informações foram enviadas para uma pré-análise de crédito. Um de nossos vendedores entrará em contato em breve com o resultado da simulação e os próximos passos. Agradecemos o contato.";

// Trade-in

pub fn ask_photos() -> String {
    with_hint("Certo. Agora, por favor, me envie *fotos* do seu veículo. (Frente, traseira, laterais e painel)")
}

pub fn photos_missing() -> String {
    format!(
        "Por favor, envie as fotos do veículo. Elas são necessárias para a avaliação. {}",
        BACK_HINT
    )
}

pub fn photo_received() -> String {
    with_hint("Foto recebida. Deseja enviar mais fotos? (Responda \"sim\" ou \"não\")")
}

pub const NEXT_PHOTO: &str = "Ok, pode enviar a próxima foto.";
pub const MORE_PHOTOS_NOT_UNDERSTOOD: &str =
    "Não compreendi. Gostaria de enviar mais fotos? (Responda \"sim\" ou \"não\")";

pub fn ask_trade_in_value() -> String {
    format!(
        "Entendido. Para concluirmos a coleta de dados, qual o valor que você gostaria de negociar pelo seu veículo?\n\n*Atenção:* O valor será analisado por nossa equipe de avaliação. Um valor muito acima do mercado pode não ser aceito. {}",
        BACK_HINT
    )
}

pub fn invalid_trade_in_value() -> String {
    with_hint("O valor informado é inválido. Por favor, digite o valor que você gostaria de negociar (ex: 35000).")
}

pub fn difference_quote(difference: f64) -> String {
    format!(
        "Certo. A diferença a ser paga pelo veículo da loja é de *{}*.",
        format_currency(Some(difference))
    )
}

pub fn ask_difference_payment() -> String {
    with_hint("Como você deseja pagar essa diferença?\n\n*1* - À vista\n*2* - Financiamento")
}

pub fn trade_in_under_review() -> String {
    with_hint("Seu veículo está sendo avaliado. Nossos vendedores entrarão em contato para negociar as condições. Qual o seu nome completo para prosseguirmos?")
}

pub fn difference_cash() -> String {
    with_hint("Entendido. Para agilizar, qual o seu nome completo, por favor?")
}

pub fn difference_financing() -> String {
    with_hint("Perfeito. Nossos vendedores entrarão em contato para realizar a simulação do financiamento da diferença. Qual o seu nome completo para prosseguirmos?")
}

pub const DIFFERENCE_NOT_UNDERSTOOD: &str =
    "Não compreendi. Por favor, escolha entre \"à vista\" ou \"financiamento\".";

pub fn ask_final_name() -> String {
    with_hint("Qual o seu nome completo para prosseguirmos?")
}

pub fn trade_in_done(name: &str) -> String {
    format!(
        "Obrigado, {}. Todas as informações foram enviadas para nossa equipe de avaliadores. Eles entrarão em contato em breve para dar prosseguimento à negociação.🚀",
        name
    )
}

// Re-entry prompts, sent when a step is resumed without new input

pub fn resume_cpf() -> String {
    with_hint("Por favor, me informe seu CPF (apenas números).")
}

pub fn resume_rg() -> String {
    with_hint("Qual o seu RG? (apenas números)")
}

pub fn resume_income_proof() -> String {
    with_hint("Por favor, envie uma foto do seu comprovante de renda mais recente.")
}

pub fn resume_rg_photo() -> String {
    with_hint("Por favor, envie uma foto do seu RG ou CNH (frente e verso, se possível).")
}

pub fn resume_more_photos() -> String {
    with_hint("Deseja enviar mais fotos? (Responda \"sim\" ou \"não\")")
}

pub fn resume_trade_in_value() -> String {
    with_hint("Qual o valor que você gostaria de negociar pelo seu veículo? (ex: 35000)")
}

// Handoff statuses reported to the sales team

pub const STATUS_VISIT: &str = "Cliente deseja agendar uma visita.";
pub const STATUS_CASH: &str = "Cliente optou por pagamento à vista.";
pub const STATUS_FINANCING: &str = "Cliente enviou dados para análise de financiamento.";
pub const STATUS_TRADE_IN: &str = "Cliente iniciou processo de troca de veículo.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_suffix() {
        assert!(cash_ask_name().ends_with(&format!("\n\n{}", BACK_HINT)));
        assert!(photos_missing().ends_with(&format!("avaliação. {}", BACK_HINT)));
    }

    #[test]
    fn test_difference_quote() {
        assert_eq!(
            difference_quote(10000.0),
            "Certo. A diferença a ser paga pelo veículo da loja é de *R$ 10.000,00*."
        );
    }
}
